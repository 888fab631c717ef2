//! Session modes and level outcomes

use serde::{Deserialize, Serialize};

use crate::lang::Translate;

/// Game mode, chosen once per session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Mode {
    #[default]
    Normal,
    /// Permanent death and full bonus level unlocking
    Challenge,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Challenge => "challenge",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(Mode::Normal),
            "challenge" | "chal" => Some(Mode::Challenge),
            _ => None,
        }
    }
}

/// Outcome of the most recent level attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Status {
    /// No attempt has finished yet
    #[default]
    None,
    /// Reached the exit
    Goal,
    /// Fell off the level
    Fall,
    /// Ran out of time
    Time,
}

impl Status {
    /// Whether the attempt cost the player a ball
    pub fn is_miss(&self) -> bool {
        matches!(self, Status::Fall | Status::Time)
    }
}

/// Display name of a mode, long ("Challenge Mode") or short ("Challenge")
pub fn mode_to_str(mode: Mode, long: bool, lang: &dyn Translate) -> String {
    let msgid = match (mode, long) {
        (Mode::Challenge, true) => "Challenge Mode",
        (Mode::Challenge, false) => "Challenge",
        (Mode::Normal, true) => "Normal Mode",
        (Mode::Normal, false) => "Normal",
    };
    lang.tr(msgid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Untranslated;

    struct Shouting;

    impl Translate for Shouting {
        fn tr(&self, msgid: &str) -> String {
            msgid.to_uppercase()
        }
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(Mode::from_str("Challenge"), Some(Mode::Challenge));
        assert_eq!(Mode::from_str("chal"), Some(Mode::Challenge));
        assert_eq!(Mode::from_str("NORMAL"), Some(Mode::Normal));
        assert_eq!(Mode::from_str("hard"), None);
        assert_eq!(Mode::from_str(Mode::Challenge.as_str()), Some(Mode::Challenge));
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(mode_to_str(Mode::Challenge, true, &Untranslated), "Challenge Mode");
        assert_eq!(mode_to_str(Mode::Challenge, false, &Untranslated), "Challenge");
        assert_eq!(mode_to_str(Mode::Normal, true, &Untranslated), "Normal Mode");
        assert_eq!(mode_to_str(Mode::Normal, false, &Shouting), "NORMAL");
    }

    #[test]
    fn test_status_miss() {
        assert!(Status::Fall.is_miss());
        assert!(Status::Time.is_miss());
        assert!(!Status::Goal.is_miss());
        assert!(!Status::None.is_miss());
    }
}
