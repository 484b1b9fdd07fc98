//! Category service
//!
//! Provides business logic for income and expense categories including CRUD
//! operations and reordering.

use chrono::Utc;
use tracing::info;

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Category, CategoryId, CategoryType};
use crate::storage::{DataChange, Storage};

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

/// Fields to change on an existing category
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, name: &str, category_type: CategoryType) -> ExpenseResult<Category> {
        let name = name.trim();

        if self.storage.categories.name_exists(name, category_type, None)? {
            return Err(ExpenseError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            });
        }

        let sort_order = self
            .storage
            .categories
            .get_by_type(category_type)?
            .iter()
            .map(|c| c.sort_order)
            .max()
            .map_or(0, |max| max + 1);

        let category = Category::with_sort_order(name, category_type, sort_order);
        category
            .validate()
            .map_err(|e| ExpenseError::Validation(e.to_string()))?;

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;
        self.storage.notify(DataChange::Categories);

        info!(category = %category.name, kind = %category.category_type, "Created category");
        Ok(category)
    }

    pub fn get(&self, id: CategoryId) -> ExpenseResult<Option<Category>> {
        self.storage.categories.get(id)
    }

    /// Find a category by name or ID string
    pub fn find(&self, identifier: &str) -> ExpenseResult<Option<Category>> {
        if let Some(category) = self.storage.categories.get_by_name(identifier)? {
            return Ok(Some(category));
        }

        if let Ok(id) = identifier.parse::<CategoryId>() {
            return self.storage.categories.get(id);
        }

        Ok(self
            .storage
            .categories
            .get_all()?
            .into_iter()
            .find(|c| c.id.short() == identifier))
    }

    /// Like `find`, but a missing category is an error
    pub fn resolve(&self, identifier: &str) -> ExpenseResult<Category> {
        self.find(identifier)?
            .ok_or_else(|| ExpenseError::category_not_found(identifier))
    }

    pub fn list(&self, category_type: Option<CategoryType>) -> ExpenseResult<Vec<Category>> {
        match category_type {
            Some(category_type) => self.storage.categories.get_by_type(category_type),
            None => self.storage.categories.get_all(),
        }
    }

    pub fn update(&self, id: CategoryId, changes: CategoryUpdate) -> ExpenseResult<Category> {
        let mut category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| ExpenseError::category_not_found(id.to_string()))?;

        if let Some(new_name) = changes.name {
            let new_name = new_name.trim();
            if self
                .storage
                .categories
                .name_exists(new_name, category.category_type, Some(id))?
            {
                return Err(ExpenseError::Duplicate {
                    entity_type: "Category",
                    identifier: new_name.to_string(),
                });
            }
            category.name = new_name.to_string();
        }
        if let Some(icon) = changes.icon {
            category.icon = icon;
        }
        if let Some(color) = changes.color {
            category.color = color;
        }
        category.updated_at = Utc::now();

        category
            .validate()
            .map_err(|e| ExpenseError::Validation(e.to_string()))?;

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;
        self.storage.notify(DataChange::Categories);

        info!(category = %category.name, "Updated category");
        Ok(category)
    }

    /// Delete a category no transaction or budget refers to
    pub fn delete(&self, id: CategoryId) -> ExpenseResult<Category> {
        let category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| ExpenseError::category_not_found(id.to_string()))?;

        let in_budget = self
            .storage
            .budgets
            .get_all()?
            .iter()
            .any(|b| b.categories.items().contains(&id));

        if in_budget || self.storage.transactions.count_by_category(id)? > 0 {
            return Err(ExpenseError::InUse {
                entity_type: "Category",
                identifier: category.name,
            });
        }

        self.storage.categories.delete(id)?;
        self.storage.categories.save()?;
        self.storage.notify(DataChange::Categories);

        info!(category = %category.name, "Deleted category");
        Ok(category)
    }

    /// Reorder categories of one type; unlisted ones keep their relative order after
    pub fn reorder(&self, category_type: CategoryType, order: &[CategoryId]) -> ExpenseResult<()> {
        let mut categories = self.storage.categories.get_by_type(category_type)?;
        categories.sort_by_key(|c| {
            order
                .iter()
                .position(|id| *id == c.id)
                .unwrap_or(order.len())
        });

        for (i, mut category) in categories.into_iter().enumerate() {
            category.sort_order = i as i32;
            category.updated_at = Utc::now();
            self.storage.categories.upsert(category)?;
        }
        self.storage.categories.save()?;
        self.storage.notify(DataChange::Categories);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::ExpensePaths;
    use crate::models::{AccountId, Budget, Money, Selection, Transaction, TransactionType};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = ExpensePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_create_appends_within_type() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        let food = service.create("Food", CategoryType::Expense).unwrap();
        let rent = service.create("Rent", CategoryType::Expense).unwrap();
        let salary = service.create("Salary", CategoryType::Income).unwrap();

        assert_eq!(food.sort_order, 0);
        assert_eq!(rent.sort_order, 1);
        assert_eq!(salary.sort_order, 0);
        assert_eq!(service.list(Some(CategoryType::Expense)).unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_names_are_per_type() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        service.create("Gifts", CategoryType::Expense).unwrap();
        assert!(service.create("Gifts", CategoryType::Income).is_ok());
        assert!(matches!(
            service.create("gifts", CategoryType::Expense),
            Err(ExpenseError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_empty_name_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        assert!(service
            .create("  ", CategoryType::Expense)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_delete_refuses_category_with_transactions() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let food = service.create("Food", CategoryType::Expense).unwrap();

        storage
            .transactions
            .upsert(Transaction::new(
                TransactionType::Expense,
                Money::from_units(3),
                food.id,
                AccountId::new(),
                Utc::now(),
            ))
            .unwrap();

        assert!(matches!(
            service.delete(food.id),
            Err(ExpenseError::InUse { .. })
        ));
    }

    #[test]
    fn test_delete_refuses_category_named_by_budget() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let fun = service.create("Fun", CategoryType::Expense).unwrap();

        let mut budget = Budget::new("Fun money", Money::from_units(50), "10-2026");
        budget.categories = Selection::Only(vec![fun.id]);
        storage.budgets.upsert(budget).unwrap();

        assert!(service.delete(fun.id).is_err());
    }

    #[test]
    fn test_update_and_delete() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let misc = service.create("Misc", CategoryType::Expense).unwrap();

        let renamed = service
            .update(
                misc.id,
                CategoryUpdate {
                    name: Some("Other".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(renamed.name, "Other");

        service.delete(misc.id).unwrap();
        assert!(service.find("Other").unwrap().is_none());
    }

    #[test]
    fn test_reorder() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let a = service.create("A", CategoryType::Expense).unwrap();
        service.create("B", CategoryType::Expense).unwrap();
        let c = service.create("C", CategoryType::Expense).unwrap();

        service.reorder(CategoryType::Expense, &[c.id, a.id]).unwrap();

        let names: Vec<_> = service
            .list(Some(CategoryType::Expense))
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }
}
