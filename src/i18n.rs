//! Prompt wording per locale
//!
//! The workflows only name what they need (`Field::Email`, a greeting);
//! the console looks the human-facing text up here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::enrollment::Field;
use crate::error::{Error, Result};

/// Supported prompt languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
    Fr,
}

impl Locale {
    /// All supported locales
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Es, Locale::Fr];

    /// Locale code as used in the config file
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
            Locale::Fr => "fr",
        }
    }

    /// Prompt label for an enrollment field
    pub fn field_label(&self, field: Field) -> &'static str {
        match (self, field) {
            (Locale::En, Field::Name) => "Name",
            (Locale::En, Field::Email) => "E-mail",
            (Locale::En, Field::Password) => "Password",
            (Locale::En, Field::InitialPreferences) => "Preferences (comma separated)",

            (Locale::Es, Field::Name) => "Nombre",
            (Locale::Es, Field::Email) => "Correo electrónico",
            (Locale::Es, Field::Password) => "Contraseña",
            (Locale::Es, Field::InitialPreferences) => "Preferencias (separadas por comas)",

            (Locale::Fr, Field::Name) => "Nom",
            (Locale::Fr, Field::Email) => "Adresse e-mail",
            (Locale::Fr, Field::Password) => "Mot de passe",
            (Locale::Fr, Field::InitialPreferences) => "Préférences (séparées par des virgules)",
        }
    }

    /// Question asked by the greeting
    pub fn name_question(&self) -> &'static str {
        match self {
            Locale::En => "What is your name?",
            Locale::Es => "¿Cómo te llamas?",
            Locale::Fr => "Comment vous appelez-vous ?",
        }
    }

    /// Greeting for a person
    pub fn greeting(&self, name: &str) -> String {
        match self {
            Locale::En => format!("Hello, {}!", name),
            Locale::Es => format!("¡Hola, {}!", name),
            Locale::Fr => format!("Bonjour, {} !", name),
        }
    }

    /// Prefix shown before a rejection reason
    pub fn try_again(&self) -> &'static str {
        match self {
            Locale::En => "Please try again",
            Locale::Es => "Inténtalo de nuevo",
            Locale::Fr => "Veuillez réessayer",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Locale::ALL
            .into_iter()
            .find(|l| l.code() == wanted)
            .ok_or_else(|| {
                Error::config_field_invalid(
                    "prompt.locale",
                    format!("Unknown locale '{}'. Must be one of: en, es, fr", s),
                )
            })
    }
}
