//! Storage initialization
//!
//! Handles first-run setup: default categories and a starter account.

use crate::config::paths::ExpensePaths;
use crate::error::ExpenseError;
use crate::models::{Account, AccountType, Category, CategoryType};

use super::accounts::AccountData;
use super::categories::CategoryData;
use super::file_io::write_json_atomic;

const DEFAULT_INCOME: &[(&str, &str, &str)] = &[
    ("Salary", "payments", "#4CAF50"),
    ("Business", "business_center", "#009688"),
    ("Gifts", "redeem", "#8BC34A"),
    ("Other Income", "savings", "#CDDC39"),
];

const DEFAULT_EXPENSE: &[(&str, &str, &str)] = &[
    ("Food", "restaurant", "#F44336"),
    ("Groceries", "shopping_cart", "#E91E63"),
    ("Transport", "directions_car", "#9C27B0"),
    ("Housing", "home", "#673AB7"),
    ("Utilities", "bolt", "#3F51B5"),
    ("Health", "medical_services", "#2196F3"),
    ("Clothing", "checkroom", "#03A9F4"),
    ("Entertainment", "movie", "#00BCD4"),
    ("Education", "school", "#FF9800"),
    ("Other", "category", "#795548"),
];

/// Initialize storage for a fresh installation
///
/// Writes default categories and a `Cash` account, but never overwrites
/// existing data files. Returns true if anything was seeded.
pub fn initialize_storage(paths: &ExpensePaths) -> Result<bool, ExpenseError> {
    paths.ensure_directories()?;

    let mut seeded = false;

    if !paths.categories_file().exists() {
        write_json_atomic(
            paths.categories_file(),
            &CategoryData {
                categories: default_categories(),
            },
        )?;
        seeded = true;
    }

    if !paths.accounts_file().exists() {
        let data = AccountData {
            accounts: vec![Account::new("Cash", AccountType::Regular)],
        };
        write_json_atomic(paths.accounts_file(), &data)?;
        seeded = true;
    }

    Ok(seeded)
}

fn default_categories() -> Vec<Category> {
    let build = |defaults: &[(&str, &str, &str)], category_type: CategoryType| {
        defaults
            .iter()
            .enumerate()
            .map(move |(i, (name, icon, color))| {
                let mut category = Category::with_sort_order(*name, category_type, i as i32);
                category.icon = (*icon).to_string();
                category.color = (*color).to_string();
                category
            })
            .collect::<Vec<_>>()
    };

    let mut categories = build(DEFAULT_INCOME, CategoryType::Income);
    categories.extend(build(DEFAULT_EXPENSE, CategoryType::Expense));
    categories
}

/// Check if storage needs initialization
pub fn needs_initialization(paths: &ExpensePaths) -> bool {
    !paths.categories_file().exists() || !paths.accounts_file().exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{AccountRepository, CategoryRepository};
    use tempfile::TempDir;

    #[test]
    fn test_initialize_storage() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ExpensePaths::with_base_dir(temp_dir.path().to_path_buf());

        assert!(needs_initialization(&paths));
        assert!(initialize_storage(&paths).unwrap());

        assert!(!needs_initialization(&paths));
        assert!(paths.data_dir().exists());
        assert!(paths.backup_dir().exists());
    }

    #[test]
    fn test_defaults_load_through_repositories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ExpensePaths::with_base_dir(temp_dir.path().to_path_buf());
        initialize_storage(&paths).unwrap();

        let categories = CategoryRepository::new(paths.categories_file());
        categories.load().unwrap();
        assert_eq!(
            categories.get_by_type(CategoryType::Income).unwrap().len(),
            DEFAULT_INCOME.len()
        );
        assert_eq!(
            categories.get_by_type(CategoryType::Expense).unwrap().len(),
            DEFAULT_EXPENSE.len()
        );

        let accounts = AccountRepository::new(paths.accounts_file());
        accounts.load().unwrap();
        assert!(accounts.get_by_name("cash").unwrap().is_some());
    }

    #[test]
    fn test_doesnt_overwrite_existing() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ExpensePaths::with_base_dir(temp_dir.path().to_path_buf());

        let custom = CategoryData {
            categories: vec![Category::new("Custom", CategoryType::Expense)],
        };
        write_json_atomic(paths.categories_file(), &custom).unwrap();

        initialize_storage(&paths).unwrap();

        let categories = CategoryRepository::new(paths.categories_file());
        categories.load().unwrap();
        assert_eq!(categories.count().unwrap(), 1);
        assert!(!initialize_storage(&paths).unwrap());
    }
}
