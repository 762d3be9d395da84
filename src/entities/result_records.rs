use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "result_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub search_id: i32,
    pub source_username: String,
    pub source_name: String,
    #[sea_orm(column_type = "Text")]
    pub source_description: String,
    pub target_handle: String,
    pub target_name: String,
    #[sea_orm(column_type = "Text")]
    pub target_description: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::search_records::Entity",
        from = "Column::SearchId",
        to = "super::search_records::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    SearchRecord,
}

impl Related<super::search_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SearchRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::ReconciledAccount {
    fn from(row: Model) -> Self {
        Self {
            source_username: row.source_username,
            source_name: row.source_name,
            source_description: row.source_description,
            target_handle: row.target_handle,
            target_name: row.target_name,
            target_description: row.target_description,
        }
    }
}
