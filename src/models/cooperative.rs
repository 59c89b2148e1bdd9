use serde::{Deserialize, Serialize};

/// A cooperative as listed by `GET /api/cooperatives/` and the public
/// signup choices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cooperative {
    pub id: i64,
    pub name: String,
}

/// Body of `POST /api/cooperatives/`.
#[derive(Debug, Serialize)]
pub struct NewCooperative<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: i64,
    /// Email, or phone number when the account has no email.
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CooperativeAdmin {
    pub id: i64,
    #[serde(default)]
    pub email: String,
}

/// `GET /api/cooperatives/{id}/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CooperativeDetail {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub admins: Vec<CooperativeAdmin>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl CooperativeDetail {
    pub fn verified_count(&self) -> usize {
        self.members.iter().filter(|m| m.is_verified).count()
    }
}

/// Result of `POST /api/cooperatives/{id}/members/{member_id}/verify/`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VerifyResult {
    pub id: i64,
    pub is_verified: bool,
}

/// A member stamped with the cooperative it was fetched from.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AggregatedMember {
    #[serde(flatten)]
    pub member: Member,
    pub cooperative_id: i64,
    pub cooperative_name: String,
}

impl AggregatedMember {
    pub fn new(member: Member, cooperative: &CooperativeDetail) -> Self {
        Self {
            member,
            cooperative_id: cooperative.id,
            cooperative_name: cooperative.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_decodes_server_shape() {
        let detail: CooperativeDetail = serde_json::from_str(
            r#"{
                "id": 4, "name": "Nyabugogo Riders",
                "created_at": "2026-02-01T08:00:00Z", "updated_at": "2026-02-05T08:00:00Z",
                "members": [
                    {"id": 10, "email": "a@x.rw", "is_verified": true},
                    {"id": 11, "email": "0788000000", "is_verified": false}
                ],
                "admins": [{"id": 2, "email": "admin@x.rw"}]
            }"#,
        )
        .unwrap();
        assert_eq!(detail.members.len(), 2);
        assert_eq!(detail.verified_count(), 1);
        assert_eq!(detail.admins[0].id, 2);
        assert!(detail.created_at.is_some());
    }

    #[test]
    fn test_aggregated_member_serializes_flat() {
        let coop = CooperativeDetail {
            id: 1,
            name: "A".into(),
            members: vec![],
            admins: vec![],
            created_at: None,
            updated_at: None,
        };
        let rec = AggregatedMember::new(
            Member { id: 5, email: "m@x.rw".into(), is_verified: false },
            &coop,
        );
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["id"], 5);
        assert_eq!(v["cooperative_id"], 1);
        assert_eq!(v["cooperative_name"], "A");
    }
}
