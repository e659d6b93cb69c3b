use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataErrorKind {
    Parse,
    Structure,
    Timing,
    Magazine,
    Modifier,
}

impl DataErrorKind {
    pub(crate) fn from_code(code: &'static str) -> Self {
        match code.get(..2) {
            Some("W1") => Self::Parse,
            Some("W2") => Self::Structure,
            Some("W3") => Self::Timing,
            Some("W4") => Self::Magazine,
            Some("W5") => Self::Modifier,
            _ => Self::Structure,
        }
    }
}

/// Load-time integrity failure of the weapon table. Never produced mid-trial.
#[derive(Debug, Error, Clone)]
#[error("{code}: {message}{}", self.location())]
pub struct DataError {
    pub code: &'static str,
    pub kind: DataErrorKind,
    pub message: String,

    pub weapon: Option<String>,
    pub index: Option<usize>,
    pub modifier: Option<String>,
}

impl DataError {
    pub(crate) fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            kind: DataErrorKind::from_code(code),
            message: message.into(),
            weapon: None,
            index: None,
            modifier: None,
        }
    }

    pub fn with_weapon(mut self, weapon: impl Into<String>) -> Self {
        self.weapon = Some(weapon.into());
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_modifier(mut self, modifier: impl Into<String>) -> Self {
        self.modifier = Some(modifier.into());
        self
    }

    fn location(&self) -> String {
        let mut parts = Vec::new();
        if let Some(w) = &self.weapon {
            parts.push(format!("weapon={w}"));
        }
        if let Some(m) = &self.modifier {
            parts.push(format!("modifier={m}"));
        }
        if let Some(i) = self.index {
            parts.push(format!("index={i}"));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!(" ({})", parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location() {
        let e = DataError::new("W3001", "time points must not decrease")
            .with_weapon("r301")
            .with_index(4);
        assert_eq!(e.kind, DataErrorKind::Timing);
        assert_eq!(
            e.to_string(),
            "W3001: time points must not decrease (weapon=r301, index=4)"
        );
    }

    #[test]
    fn display_without_location() {
        let e = DataError::new("W1001", "invalid weapon table json");
        assert_eq!(e.kind, DataErrorKind::Parse);
        assert_eq!(e.to_string(), "W1001: invalid weapon table json");
    }
}
