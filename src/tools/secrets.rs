//! Password and UUID generation

use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use super::ToolError;

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const DIGITS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

pub const MIN_PASSWORD_LENGTH: usize = 4;
pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const DEFAULT_PASSWORD_LENGTH: usize = 16;

/// Upper bound on UUIDs per request
pub const MAX_UUID_COUNT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Weak,
    Medium,
    Strong,
    #[serde(rename = "very strong")]
    VeryStrong,
}

#[derive(Debug, Clone, Copy)]
pub struct PasswordOptions {
    pub length: usize,
    pub uppercase: bool,
    pub lowercase: bool,
    pub numbers: bool,
    pub symbols: bool,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            length: DEFAULT_PASSWORD_LENGTH,
            uppercase: true,
            lowercase: true,
            numbers: true,
            symbols: true,
        }
    }
}

pub fn password_strength(password: &str) -> Strength {
    let len = password.chars().count();
    let checks = [
        len >= 8,
        len >= 12,
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    match checks.iter().filter(|c| **c).count() {
        0..=2 => Strength::Weak,
        3 => Strength::Medium,
        4 => Strength::Strong,
        _ => Strength::VeryStrong,
    }
}

pub fn generate_password(opts: &PasswordOptions) -> Result<String, ToolError> {
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&opts.length) {
        return Err(ToolError::invalid(format!(
            "Password length must be between {} and {}",
            MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
        )));
    }

    let alphabet: Vec<char> = [
        (opts.uppercase, UPPERCASE),
        (opts.lowercase, LOWERCASE),
        (opts.numbers, DIGITS),
        (opts.symbols, SYMBOLS),
    ]
    .iter()
    .filter(|(enabled, _)| *enabled)
    .flat_map(|(_, set)| set.chars())
    .collect();

    if alphabet.is_empty() {
        return Err(ToolError::invalid("Select at least one character type."));
    }

    let mut rng = rand::rng();
    Ok((0..opts.length)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())])
        .collect())
}

/// Named namespace or a UUID literal
fn parse_namespace(namespace: &str) -> Result<Uuid, ToolError> {
    match namespace.to_ascii_lowercase().as_str() {
        "dns" => Ok(Uuid::NAMESPACE_DNS),
        "url" => Ok(Uuid::NAMESPACE_URL),
        "oid" => Ok(Uuid::NAMESPACE_OID),
        "x500" => Ok(Uuid::NAMESPACE_X500),
        other => Uuid::parse_str(other)
            .map_err(|e| ToolError::invalid(format!("Invalid UUID v5 inputs: {}", e))),
    }
}

pub fn generate_uuids(
    version: u8,
    namespace: Option<&str>,
    name: Option<&str>,
    count: usize,
) -> Result<Vec<String>, ToolError> {
    match version {
        4 => {
            let count = count.clamp(1, MAX_UUID_COUNT);
            Ok((0..count).map(|_| Uuid::new_v4().to_string()).collect())
        }
        5 => {
            let (Some(namespace), Some(name)) = (
                namespace.filter(|s| !s.is_empty()),
                name.filter(|s| !s.is_empty()),
            ) else {
                return Err(ToolError::invalid(
                    "Namespace and name are required for UUID v5.",
                ));
            };
            let namespace = parse_namespace(namespace)?;
            Ok(vec![Uuid::new_v5(&namespace, name.as_bytes()).to_string()])
        }
        other => Err(ToolError::unsupported("UUID version", other.to_string())),
    }
}
