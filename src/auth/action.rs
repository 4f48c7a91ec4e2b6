use std::str::FromStr;

/// Actions reserved for the privileged identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateCategory,
    DeletePost,
    WriteConfig,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::CreateCategory => "create_category",
            Action::DeletePost => "delete_post",
            Action::WriteConfig => "write_config",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create_category" => Ok(Action::CreateCategory),
            "delete_post" => Ok(Action::DeletePost),
            "write_config" => Ok(Action::WriteConfig),
            _ => Err(format!("unknown action: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names() {
        for action in [Action::CreateCategory, Action::DeletePost, Action::WriteConfig] {
            assert_eq!(action.as_str().parse::<Action>(), Ok(action));
        }
        assert!("drop_database".parse::<Action>().is_err());
    }
}
