use core::cmp::Ordering;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Privilege tier assigned to a principal.
///
/// The set is closed and totally ordered by [`Role::rank`]:
/// `user (0) < admin (1) < super_admin (2)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Admin, Role::SuperAdmin];

    pub fn rank(self) -> u8 {
        match self {
            Role::User => 0,
            Role::Admin => 1,
            Role::SuperAdmin => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Whether this role meets a required minimum.
    pub fn satisfies(self, required: Role) -> bool {
        self.rank() >= required.rank()
    }
}

impl Ord for Role {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    #[test]
    fn ranks_match_documented_order() {
        assert_eq!(Role::User.rank(), 0);
        assert_eq!(Role::Admin.rank(), 1);
        assert_eq!(Role::SuperAdmin.rank(), 2);
        assert!(Role::User < Role::Admin && Role::Admin < Role::SuperAdmin);
    }

    #[test]
    fn super_admin_satisfies_everything() {
        for required in Role::ALL {
            assert!(Role::SuperAdmin.satisfies(required));
        }
        assert!(!Role::User.satisfies(Role::Admin));
    }

    #[test]
    fn parses_wire_names() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!(
            "owner".parse::<Role>().unwrap_err(),
            UnknownRole("owner".to_string())
        );
    }

    #[test]
    fn serde_uses_snake_case() {
        assert_eq!(serde_json::to_string(&Role::SuperAdmin).unwrap(), "\"super_admin\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    proptest! {
        /// Property: `satisfies` agrees with the rank ordering for every pair.
        #[test]
        fn satisfies_is_rank_comparison(held in any_role(), required in any_role()) {
            prop_assert_eq!(held.satisfies(required), held.rank() >= required.rank());
            prop_assert_eq!(held.satisfies(required), held >= required);
        }
    }
}
