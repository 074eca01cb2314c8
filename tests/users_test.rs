use idlink::errors::ErrorCode;
use idlink::models::{account::AccountInput, user::{NameInput, UserInput}};
use idlink::repos::IdentityRepo;
use idlink::scopes;

#[path = "common.rs"]
mod common;

fn codes(err: idlink::errors::ServiceError) -> Vec<ErrorCode> {
    err.validation().expect("validation failure").codes().collect()
}

#[tokio::test]
async fn ada_signs_up_once() {
    let env = common::init_test_env().expect("init env");

    let ada = common::create_user(&env, common::ada()).await;
    assert_eq!(ada.name.first, "Ada");
    assert_eq!(ada.name.last, "Lovelace");
    assert_eq!(ada.email, "ada@x.com");
    assert_ne!(ada.password_hash, "analytical-engine");

    let fetched = env.state.users.retrieve(&ada.id).await.unwrap().expect("stored");
    assert_eq!(fetched, ada);
    assert!(env.state.users.exists("ada@x.com").await.unwrap());
    assert_eq!(env.state.users.with_email("ADA@x.com ").await.unwrap().map(|u| u.id), Some(ada.id));

    let err = env.state.users.create(common::ada()).await.unwrap_err();
    assert_eq!(codes(err), vec![ErrorCode::UserEmailAlreadyExists]);
}

#[tokio::test]
async fn email_is_folded_before_it_is_checked() {
    let env = common::init_test_env().expect("init env");

    let ada = common::create_user(&env, common::user_input("Ada", "Lovelace", " Ada@X.com ")).await;
    assert_eq!(ada.email, "ada@x.com");
    let fetched = env.state.users.retrieve(&ada.id).await.unwrap().expect("stored");
    assert_eq!(fetched.email, "ada@x.com");

    let err = env
        .state
        .users
        .create(common::user_input("Ada", "Lovelace", "ADA@x.com"))
        .await
        .unwrap_err();
    assert_eq!(codes(err), vec![ErrorCode::UserEmailAlreadyExists]);

    let partial = UserInput {
        email: Some("  Countess@X.com".into()),
        ..UserInput::default()
    };
    let updated = env.state.users.update(&ada, partial).await.unwrap();
    assert_eq!(updated.email, "countess@x.com");
}

#[tokio::test]
async fn every_invalid_field_is_reported() {
    let env = common::init_test_env().expect("init env");

    let input = UserInput {
        name: Some(NameInput { first: Some("  ".into()), last: None }),
        email: Some("not-an-email".into()),
        password: Some("short".into()),
        birthday: Some("10/12/1815".into()),
        phone: Some("call me".into()),
    };
    let err = env.state.users.create(input).await.unwrap_err();
    assert_eq!(
        codes(err),
        vec![
            ErrorCode::UserNameFirstRequired,
            ErrorCode::UserNameLastRequired,
            ErrorCode::UserEmailInvalid,
            ErrorCode::UserPasswordTooShort,
            ErrorCode::UserBirthdayInvalid,
            ErrorCode::UserPhoneInvalid,
        ]
    );

    let err = env.state.users.create(UserInput::default()).await.unwrap_err();
    assert_eq!(
        codes(err),
        vec![
            ErrorCode::UserNameFirstRequired,
            ErrorCode::UserNameLastRequired,
            ErrorCode::UserEmailRequired,
            ErrorCode::UserPasswordRequired,
        ]
    );
}

#[tokio::test]
async fn update_merges_present_fields_only() {
    let env = common::init_test_env().expect("init env");
    let ada = common::create_user(&env, common::ada()).await;

    let partial = UserInput {
        name: Some(NameInput { first: None, last: Some("King".into()) }),
        phone: Some("+44 20 7946 0000".into()),
        ..Default::default()
    };
    let updated = env.state.users.update(&ada, partial).await.unwrap();
    assert_eq!(updated.name.first, "Ada");
    assert_eq!(updated.name.last, "King");
    assert_eq!(updated.email, "ada@x.com");
    assert_eq!(updated.birthday.as_deref(), Some("1815-12-10"));
    assert_eq!(updated.phone.as_deref(), Some("+44 20 7946 0000"));
    assert_eq!(updated.password_hash, ada.password_hash);

    let err = env
        .state
        .users
        .update(&updated, UserInput { password: Some("short".into()), ..Default::default() })
        .await
        .unwrap_err();
    assert_eq!(codes(err), vec![ErrorCode::UserPasswordTooShort]);
}

#[tokio::test]
async fn update_rejects_an_email_taken_by_someone_else() {
    let env = common::init_test_env().expect("init env");
    let ada = common::create_user(&env, common::ada()).await;
    common::create_user(&env, common::user_input("Charles", "Babbage", "charles@x.com")).await;

    let taken = UserInput { email: Some("charles@x.com".into()), ..Default::default() };
    let err = env.state.users.update(&ada, taken).await.unwrap_err();
    assert_eq!(codes(err), vec![ErrorCode::UserEmailAlreadyExists]);

    let own = UserInput { email: Some("ada@x.com".into()), ..Default::default() };
    assert!(env.state.users.update(&ada, own).await.is_ok());
}

#[tokio::test]
async fn delete_cascades_to_owned_apps_and_accounts() {
    let env = common::init_test_env().expect("init env");
    let ada = common::create_user(&env, common::ada()).await;
    let charles = common::create_user(&env, common::user_input("Charles", "Babbage", "charles@x.com")).await;

    let first = common::create_app(&env, &ada, common::app_input("Engine", "https://engine.example.com", &[scopes::NAME])).await;
    let second = common::create_app(&env, &ada, common::app_input("Notes", "https://notes.example.com", &[scopes::EMAIL])).await;
    let foreign = common::create_app(&env, &charles, common::app_input("Diff", "https://diff.example.com", &[scopes::PROFILE])).await;

    // Charles linked to one of Ada's apps; Ada linked to Charles' app.
    env.state.accounts.create(AccountInput { app: Some(first.id.clone()) }, &charles).await.unwrap();
    env.state.accounts.create(AccountInput { app: Some(foreign.id.clone()) }, &ada).await.unwrap();

    env.state.users.delete(&ada).await.unwrap();

    assert!(env.state.users.retrieve(&ada.id).await.unwrap().is_none());
    for app in [&first, &second] {
        assert!(env.state.apps.retrieve(&app.id).await.unwrap().is_none());
        assert!(env.repo.list_app_scopes(&app.id).await.unwrap().is_empty());
        assert!(env.repo.list_accounts_for_app(&app.id).await.unwrap().is_empty());
    }
    assert!(env.repo.list_accounts_for_user(&ada.id).await.unwrap().is_empty());
    assert!(env.repo.list_accounts_for_user(&charles.id).await.unwrap().is_empty());

    // Charles and his app are untouched.
    assert!(env.state.users.retrieve(&charles.id).await.unwrap().is_some());
    assert!(env.state.apps.retrieve(&foreign.id).await.unwrap().is_some());

    // Deleting again is a no-op.
    env.state.users.delete(&ada).await.unwrap();
}
