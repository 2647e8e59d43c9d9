// i18n/mod.rs - Message catalogues and `%`-style interpolation
//
// Every client-facing message goes through `gettext` before interpolation,
// so catalogue keys are always the untranslated templates.

use indexmap::IndexMap;
use once_cell::sync::{Lazy, OnceCell};
use std::collections::HashMap;
use std::fmt::Display;

pub const DEFAULT_LANGUAGE: &str = "en";

static ACTIVE_LANGUAGE: OnceCell<String> = OnceCell::new();

type Catalogue = HashMap<&'static str, &'static str>;

static CATALOGUES: Lazy<HashMap<&'static str, Catalogue>> = Lazy::new(|| {
    let mut catalogues = HashMap::new();
    catalogues.insert(
        "fr",
        HashMap::from([
            ("message undefined", "message non défini"),
            ("Invalid Credentials", "Identifiants invalides"),
            (
                "Unable to log in with provided credentials.",
                "Impossible de se connecter avec les identifiants fournis.",
            ),
            ("Unprocessable Entity", "Entité non traitable"),
            ("Authentication Timeout", "Délai d'authentification dépassé"),
            ("Access Forbidden", "Accès interdit"),
            ("Bad Request", "Requête incorrecte"),
            (
                "Service temporarily unavailable, try again later.",
                "Service temporairement indisponible, réessayez plus tard.",
            ),
            ("This field is required.", "Ce champ est obligatoire."),
            ("This field may not be blank.", "Ce champ ne peut être vide."),
            ("This field may not be null.", "Ce champ ne peut être nul."),
            ("Not a valid string.", "Chaîne de caractères invalide."),
            ("A valid integer is required.", "Un nombre entier valide est requis."),
            ("Must be a valid boolean.", "Doit être un booléen valide."),
            ("Enter a valid email address.", "Saisissez une adresse e-mail valide."),
            (
                "Ensure this field has no more than %(max_length)d characters.",
                "Assurez-vous que ce champ comporte au plus %(max_length)d caractères.",
            ),
            (
                "Ensure this field has at least %(min_length)d characters.",
                "Assurez-vous que ce champ comporte au moins %(min_length)d caractères.",
            ),
            (
                "User %(username)s not found.",
                "Utilisateur %(username)s introuvable.",
            ),
            (
                "A user with username %(username)s already exists.",
                "Un utilisateur nommé %(username)s existe déjà.",
            ),
        ]),
    );
    catalogues
});

/// Select the process-wide language. Only the first call wins.
pub fn activate(language: &str) -> bool {
    ACTIVE_LANGUAGE.set(language.to_string()).is_ok()
}

pub fn active_language() -> &'static str {
    ACTIVE_LANGUAGE
        .get()
        .map(String::as_str)
        .unwrap_or(DEFAULT_LANGUAGE)
}

/// Translate a message template into the active language
pub fn gettext(message: &str) -> String {
    translate(active_language(), message)
}

/// Translate a message template into `language`, falling back to the template
pub fn translate(language: &str, message: &str) -> String {
    CATALOGUES
        .get(language)
        .and_then(|catalogue| catalogue.get(message))
        .map(|translated| translated.to_string())
        .unwrap_or_else(|| message.to_string())
}

/// Named interpolation parameters for `%(name)s` placeholders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(IndexMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.0.insert(name.into(), value.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Apply `%(name)s`-style parameters to a template.
///
/// `%%` renders a literal percent sign. Placeholders whose name is not in
/// `params` are kept verbatim.
pub fn interpolate(template: &str, params: &Params) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];

        if let Some(after) = tail.strip_prefix('%') {
            out.push('%');
            rest = after;
            continue;
        }

        match parse_placeholder(tail) {
            Some((name, consumed)) => {
                match params.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[pos..pos + 1 + consumed]),
                }
                rest = &tail[consumed..];
            }
            None => {
                out.push('%');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}

// `(name)x` where x is a conversion character; returns the name and the byte
// length of the whole placeholder after the leading `%`.
fn parse_placeholder(tail: &str) -> Option<(&str, usize)> {
    let inner = tail.strip_prefix('(')?;
    let close = inner.find(')')?;
    let name = &inner[..close];
    let conversion = inner[close + 1..].chars().next()?;
    if !matches!(conversion, 's' | 'd' | 'i' | 'r' | 'f') {
        return None;
    }
    Some((name, 1 + close + 1 + conversion.len_utf8()))
}
