use diesel::{Queryable, Selectable};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = crate::models::schema::users)]
pub struct User {
    pub username: String,
    pub email: String,
    pub wallet: i32,
}
