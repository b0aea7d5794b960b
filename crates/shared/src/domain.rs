use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(InvestmentId);
id_newtype!(InvestorId);

impl InvestmentId {
    /// Id carried by a record the backend has not assigned yet.
    pub const UNSET: InvestmentId = InvestmentId(0);

    pub fn is_unset(self) -> bool {
        self == Self::UNSET
    }
}
