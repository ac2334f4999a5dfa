use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "loan_applications", schema_name = "public")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub id_number: String,
    pub whatsapp_number: String,
    pub contact_person_name: String,
    pub contact_person_phone: String,
    pub next_of_kin_name: String,
    pub next_of_kin_contact: String,
    pub occupation: String,
    pub employment_status: String,
    pub income_level: String,
    pub loan_reason: Option<String>,
    pub loan_limit: i64,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
