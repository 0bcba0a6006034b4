use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One education entry. Index 0 of `Profile::education` is the most recent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub year: String,
}

/// One experience entry. Index 0 of `Profile::experience` is the most recent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub duration: String,
    pub description: String,
}

/// The applicant profile the engine fills forms from.
///
/// Keys are camelCase so records written by the browser extension's sync
/// storage deserialize unchanged. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub skills: Vec<String>,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certifications: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
}

impl Profile {
    /// "First [Middle] Last" with single spaces; the middle name is dropped when blank.
    pub fn full_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The credential for the generative-text API, if one is set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// A profile is usable once the three identity fields are filled in.
    pub fn is_complete(&self) -> bool {
        !self.first_name.trim().is_empty()
            && !self.last_name.trim().is_empty()
            && !self.email.trim().is_empty()
    }

    /// Copy with the credential removed, for responses leaving the service.
    pub fn redacted(&self) -> Self {
        Self {
            gemini_api_key: None,
            ..self.clone()
        }
    }

    /// Builds a profile from the flat key space of the store. Unknown keys
    /// (settings, stray values) are ignored; malformed values fall back to defaults
    /// field by field rather than discarding the whole record.
    pub fn from_entries(entries: &Map<String, Value>) -> Self {
        match serde_json::from_value::<Profile>(Value::Object(entries.clone())) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("Stored profile did not deserialize cleanly: {e}");
                let mut profile = Profile::default();
                let mut single = Map::new();
                for (key, value) in entries {
                    single.clear();
                    single.insert(key.clone(), value.clone());
                    if let Ok(partial) = serde_json::from_value::<Profile>(Value::Object(single.clone())) {
                        profile.merge_from(partial, key);
                    }
                }
                profile
            }
        }
    }

    fn merge_from(&mut self, partial: Profile, key: &str) {
        match key {
            "firstName" => self.first_name = partial.first_name,
            "middleName" => self.middle_name = partial.middle_name,
            "lastName" => self.last_name = partial.last_name,
            "email" => self.email = partial.email,
            "phone" => self.phone = partial.phone,
            "address" => self.address = partial.address,
            "city" => self.city = partial.city,
            "state" => self.state = partial.state,
            "zipCode" => self.zip_code = partial.zip_code,
            "skills" => self.skills = partial.skills,
            "education" => self.education = partial.education,
            "experience" => self.experience = partial.experience,
            "certifications" => self.certifications = partial.certifications,
            "languages" => self.languages = partial.languages,
            "geminiApiKey" => self.gemini_api_key = partial.gemini_api_key,
            _ => {}
        }
    }

    /// Flattens the profile into store entries.
    pub fn to_entries(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Switches stored alongside the profile. Anything other than an explicit
/// `false` counts as enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub auto_fill_enabled: bool,
    #[serde(rename = "useAIForUnknownFields")]
    pub use_ai_for_unknown_fields: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_fill_enabled: true,
            use_ai_for_unknown_fields: true,
        }
    }
}

impl Settings {
    pub const AUTO_FILL_KEY: &'static str = "autoFillEnabled";
    pub const USE_AI_KEY: &'static str = "useAIForUnknownFields";

    pub fn from_entries(entries: &Map<String, Value>) -> Self {
        let enabled = |key: &str| entries.get(key) != Some(&Value::Bool(false));
        Self {
            auto_fill_enabled: enabled(Self::AUTO_FILL_KEY),
            use_ai_for_unknown_fields: enabled(Self::USE_AI_KEY),
        }
    }

    pub fn to_entries(self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(Self::AUTO_FILL_KEY.to_string(), Value::Bool(self.auto_fill_enabled));
        map.insert(
            Self::USE_AI_KEY.to_string(),
            Value::Bool(self.use_ai_for_unknown_fields),
        );
        map
    }
}
