#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Manager = 2,
    Field = 3,
}

impl Role {
    /// Role travels as an id inside the token claims; it is mapped back here
    /// and never inferred from a user id.
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Manager),
            3 => Some(Role::Field),
            _ => None,
        }
    }
}
