use crate::error::AppResult;
use crate::store::UnitOfWork;

use super::errors::CatalogError;
use super::model::{CatalogItem, CatalogItemDraft};

// ============================================================================
// Catalog Operations
// ============================================================================
//
// Plain single-table CRUD. Deleting an item cascades to every order that
// references it (and their status rows); that is enforced by storage.
//
// ============================================================================

pub async fn create_item(uow: &mut dyn UnitOfWork, draft: CatalogItemDraft) -> AppResult<CatalogItem> {
    let draft = draft.validate()?;
    let item = uow.insert_catalog_item(&draft).await?;

    tracing::info!(item_id = item.id, food_name = %item.food_name, price = %item.price, "Created food item");
    Ok(item)
}

pub async fn get_item(uow: &mut dyn UnitOfWork, id: i64) -> AppResult<CatalogItem> {
    let item = uow
        .find_catalog_item(id)
        .await?
        .ok_or(CatalogError::NotFound(id))?;
    Ok(item)
}

pub async fn list_items(uow: &mut dyn UnitOfWork) -> AppResult<Vec<CatalogItem>> {
    Ok(uow.list_catalog_items().await?)
}

pub async fn update_item(
    uow: &mut dyn UnitOfWork,
    id: i64,
    draft: CatalogItemDraft,
) -> AppResult<CatalogItem> {
    let draft = draft.validate()?;
    let item = uow
        .update_catalog_item(id, &draft)
        .await?
        .ok_or(CatalogError::NotFound(id))?;

    tracing::info!(item_id = id, price = %item.price, "Updated food item");
    Ok(item)
}

pub async fn delete_item(uow: &mut dyn UnitOfWork, id: i64) -> AppResult<()> {
    if !uow.delete_catalog_item(id).await? {
        return Err(CatalogError::NotFound(id).into());
    }

    tracing::info!(item_id = id, "Deleted food item and its orders");
    Ok(())
}
