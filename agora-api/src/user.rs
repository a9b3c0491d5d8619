use std::fmt;

#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn stub() -> UserId {
        UserId(String::from("stub-user"))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: UserId,
    pub display_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub reputation_points: i64,
}

impl Author {
    pub fn stub() -> Author {
        Author {
            id: UserId::stub(),
            display_name: String::from("stub"),
            avatar: None,
            reputation_points: 0,
        }
    }
}
