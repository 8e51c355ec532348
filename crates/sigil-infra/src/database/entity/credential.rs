//! Credential entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "credentials")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub identifier: String,
    pub secret_hash: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to domain Credential.
impl From<Model> for sigil_core::domain::Credential {
    fn from(model: Model) -> Self {
        Self {
            identifier: model.identifier,
            secret_hash: model.secret_hash,
            created_at: model.created_at.into(),
        }
    }
}

/// Conversion from domain Credential to SeaORM ActiveModel.
impl From<sigil_core::domain::Credential> for ActiveModel {
    fn from(credential: sigil_core::domain::Credential) -> Self {
        Self {
            identifier: Set(credential.identifier),
            secret_hash: Set(credential.secret_hash),
            created_at: Set(credential.created_at.into()),
        }
    }
}
