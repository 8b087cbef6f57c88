//! List service tests

#[path = "../common/mod.rs"]
mod common;

use assert_matches::assert_matches;

use common::TestContext;
use todo_lists_lib::AppError;

#[test]
fn test_list_names_unique_per_user() {
    let ctx = TestContext::new();
    let alice = ctx.user("alice");
    let bob = ctx.user("bob");

    ctx.state.list_service.create_list(alice.id, "Work").unwrap();
    assert_matches!(
        ctx.state.list_service.create_list(alice.id, "Work"),
        Err(AppError::Conflict(_))
    );
    // Trimmed before the uniqueness check
    assert_matches!(
        ctx.state.list_service.create_list(alice.id, "  Work "),
        Err(AppError::Conflict(_))
    );

    // The same name under another user is fine
    let bobs = ctx.state.list_service.create_list(bob.id, "Work").unwrap();
    assert_eq!(bobs.user_id, bob.id);
}

#[test]
fn test_list_summaries_count_todos() {
    let ctx = TestContext::new();
    let alice = ctx.user("alice");
    let list = ctx.state.list_service.create_list(alice.id, "Errands").unwrap();

    let todos = &ctx.state.todo_service;
    let done = todos.create_todo_in_list(alice.id, list.id, "Post office").unwrap();
    todos.create_todo_in_list(alice.id, list.id, "Bank").unwrap();
    todos.set_completion("alice", done.id, true).unwrap();

    let summaries = ctx.state.list_service.list_lists(alice.id).unwrap();
    let errands = summaries
        .iter()
        .find(|s| s.list.id == list.id)
        .expect("Errands should be listed");
    assert_eq!(errands.todo_count, 2);
    assert_eq!(errands.completed_count, 1);
    assert_eq!(errands.pending_count(), 1);
}

#[test]
fn test_rename_rules() {
    let ctx = TestContext::new();
    let alice = ctx.user("alice");
    let home = ctx.state.list_service.create_list(alice.id, "Home").unwrap();
    ctx.state.list_service.create_list(alice.id, "Garden").unwrap();

    let same = ctx.state.list_service.rename_list(alice.id, home.id, "Home").unwrap();
    assert_eq!(same, home);

    assert_matches!(
        ctx.state.list_service.rename_list(alice.id, home.id, "Garden"),
        Err(AppError::Conflict(_))
    );

    let renamed = ctx.state.list_service.rename_list(alice.id, home.id, "House").unwrap();
    assert_eq!(renamed.name, "House");
    assert_eq!(renamed.id, home.id);
}

#[test]
fn test_foreign_list_is_not_found() {
    let ctx = TestContext::new();
    let alice = ctx.user("alice");
    let mallory = ctx.user("mallory");
    let private = ctx.state.list_service.create_list(alice.id, "Private").unwrap();

    assert_matches!(
        ctx.state.list_service.get_list(mallory.id, private.id),
        Err(AppError::NotFound(_))
    );
    assert_matches!(
        ctx.state.list_service.rename_list(mallory.id, private.id, "Mine"),
        Err(AppError::NotFound(_))
    );
    assert_matches!(
        ctx.state.list_service.delete_list(mallory.id, private.id),
        Err(AppError::NotFound(_))
    );
    assert_eq!(ctx.state.list_service.get_list(alice.id, private.id).unwrap(), private);
}

#[test]
fn test_last_list_cannot_be_deleted() {
    let ctx = TestContext::new();
    let alice = ctx.user("alice");
    let default = ctx.state.list_service.default_list(alice.id).unwrap();
    let extra = ctx.state.list_service.create_list(alice.id, "Extra").unwrap();

    ctx.state.list_service.delete_list(alice.id, extra.id).unwrap();
    assert_matches!(
        ctx.state.list_service.delete_list(alice.id, default.id),
        Err(AppError::Conflict(_))
    );
    assert_eq!(ctx.state.list_service.list_lists(alice.id).unwrap().len(), 1);
}

#[test]
fn test_deleting_list_removes_its_todos() {
    let ctx = TestContext::new();
    let alice = ctx.user("alice");
    let list = ctx.state.list_service.create_list(alice.id, "Temp").unwrap();
    ctx.state
        .todo_service
        .create_todo_in_list(alice.id, list.id, "Short lived")
        .unwrap();

    ctx.state.list_service.delete_list(alice.id, list.id).unwrap();
    assert_eq!(ctx.scalar("SELECT COUNT(*) FROM todos"), 0);
}
