//! Integration tests for account creation and listing.

mod common;

use budgie_core::ledger::{AccountFilter, AccountType, LedgerError, LedgerStore};
use common::{account, store, user_with_accounts};

#[tokio::test]
async fn test_create_then_list_by_name_and_type() {
    let store = store().await;
    let scope = user_with_accounts(&store, "list").await;

    let id = store
        .create_account(&scope, account("rent", AccountType::Expense))
        .await
        .unwrap();

    let found = store
        .list_accounts(
            &scope,
            &AccountFilter::new()
                .name("rent")
                .account_type(AccountType::Expense),
        )
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, id);
    assert_eq!(found[0].name, "rent");
    assert_eq!(found[0].account_type, AccountType::Expense);
    assert_eq!(found[0].description, "rent account");
}

#[tokio::test]
async fn test_duplicate_name_and_type_rejected() {
    let store = store().await;
    let scope = user_with_accounts(&store, "dup").await;

    let err = store
        .create_account(&scope, account("bank", AccountType::Asset))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LedgerError::DuplicateAccount { name, account_type: AccountType::Asset } if name == "bank"
    ));
}

#[tokio::test]
async fn test_same_name_different_type_allowed() {
    let store = store().await;
    let scope = user_with_accounts(&store, "types").await;

    store
        .create_account(&scope, account("bank", AccountType::Liability))
        .await
        .unwrap();

    let banks = store
        .list_accounts(&scope, &AccountFilter::new().name("bank"))
        .await
        .unwrap();
    let kinds: Vec<AccountType> = banks.iter().map(|a| a.account_type).collect();
    assert_eq!(kinds, [AccountType::Asset, AccountType::Liability]);
}

#[tokio::test]
async fn test_list_is_ordered_and_filtered_by_type() {
    let store = store().await;
    let scope = user_with_accounts(&store, "order").await;

    let all = store.list_accounts(&scope, &AccountFilter::new()).await.unwrap();
    let names: Vec<&str> = all.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["bank", "groceries", "salary"]);

    let income = store
        .list_accounts(&scope, &AccountFilter::new().account_type(AccountType::Income))
        .await
        .unwrap();
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].name, "salary");

    let none = store
        .list_accounts(&scope, &AccountFilter::new().account_type(AccountType::Equity))
        .await
        .unwrap();
    assert!(none.is_empty());
}
