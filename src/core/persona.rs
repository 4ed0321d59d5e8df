use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const BASIC_WELCOME: &str = "您好，我是医美AI客服助手，有什么可以帮您？";
pub const CUTIE_WELCOME: &str =
    "哈喽呀，我是您的美容小助理，有什么变美的愿望可以和我许愿呢～✨";

/// The two bot personas a session can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    /// Formal customer-service agent.
    #[default]
    Basic,
    /// Friendlier, more casual assistant.
    Cutie,
}

impl Persona {
    pub fn id(self) -> &'static str {
        match self {
            Persona::Basic => "basic",
            Persona::Cutie => "cutie",
        }
    }

    /// The persona a toggle switches to.
    pub fn other(self) -> Self {
        match self {
            Persona::Basic => Persona::Cutie,
            Persona::Cutie => Persona::Basic,
        }
    }

    pub fn default_label(self) -> &'static str {
        match self {
            Persona::Basic => "常规Bot",
            Persona::Cutie => "人性化Bot",
        }
    }

    pub fn default_icon(self) -> &'static str {
        match self {
            Persona::Basic => "🤖",
            Persona::Cutie => "🧠",
        }
    }

    pub fn default_welcome(self) -> &'static str {
        match self {
            Persona::Basic => BASIC_WELCOME,
            Persona::Cutie => CUTIE_WELCOME,
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Persona {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Persona::Basic),
            "cutie" => Ok(Persona::Cutie),
            other => Err(format!(
                "Unknown persona '{other}'. Available personas: basic, cutie"
            )),
        }
    }
}

/// Everything the client needs to know about one persona.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaProfile {
    pub bot_id: String,
    pub welcome: String,
    pub label: String,
    pub icon: String,
}

impl PersonaProfile {
    pub fn new(persona: Persona, bot_id: impl Into<String>, welcome: Option<String>) -> Self {
        Self {
            bot_id: bot_id.into(),
            welcome: welcome.unwrap_or_else(|| persona.default_welcome().to_string()),
            label: persona.default_label().to_string(),
            icon: persona.default_icon().to_string(),
        }
    }
}

/// Read-only persona lookup, built once at startup.
#[derive(Debug, Clone)]
pub struct PersonaTable {
    basic: PersonaProfile,
    cutie: PersonaProfile,
}

impl PersonaTable {
    pub fn new(basic: PersonaProfile, cutie: PersonaProfile) -> Self {
        Self { basic, cutie }
    }

    pub fn get(&self, persona: Persona) -> &PersonaProfile {
        match persona {
            Persona::Basic => &self.basic,
            Persona::Cutie => &self.cutie,
        }
    }

    pub fn bot_id(&self, persona: Persona) -> &str {
        &self.get(persona).bot_id
    }

    pub fn welcome(&self, persona: Persona) -> &str {
        &self.get(persona).welcome
    }
}
