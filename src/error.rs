use std::fmt;

#[derive(Debug)]
pub enum DimuraError {
    Param(ParamError),
    State(StateError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    UnknownKey(String),
    NotFinite { key: String },
}

#[derive(Debug)]
pub enum StateError {
    Json(serde_json::Error),
    MissingVersion,
}

impl fmt::Display for DimuraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimuraError::Param(e) => write!(f, "Parameter error: {e}"),
            DimuraError::State(e) => write!(f, "State error: {e}"),
        }
    }
}

impl std::error::Error for DimuraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DimuraError::Param(e) => Some(e),
            DimuraError::State(e) => Some(e),
        }
    }
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::UnknownKey(key) => write!(f, "Unknown parameter '{key}'"),
            ParamError::NotFinite { key } => write!(f, "Non-finite value for parameter '{key}'"),
        }
    }
}

impl std::error::Error for ParamError {}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::Json(e) => write!(f, "Invalid state JSON: {e}"),
            StateError::MissingVersion => write!(f, "State is missing 'stateVersion'"),
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StateError::Json(e) => Some(e),
            StateError::MissingVersion => None,
        }
    }
}

impl From<ParamError> for DimuraError {
    fn from(e: ParamError) -> Self {
        DimuraError::Param(e)
    }
}

impl From<StateError> for DimuraError {
    fn from(e: StateError) -> Self {
        DimuraError::State(e)
    }
}

impl From<serde_json::Error> for StateError {
    fn from(e: serde_json::Error) -> Self {
        StateError::Json(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_key() {
        let e = ParamError::UnknownKey("warmth".to_string());
        assert_eq!(e.to_string(), "Unknown parameter 'warmth'");
        let e: DimuraError = ParamError::NotFinite { key: "drive".into() }.into();
        assert_eq!(e.to_string(), "Parameter error: Non-finite value for parameter 'drive'");
    }

    #[test]
    fn json_errors_convert() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e: DimuraError = StateError::from(json_err).into();
        assert!(e.to_string().starts_with("State error: Invalid state JSON"));
        assert!(std::error::Error::source(&e).is_some());
    }
}
