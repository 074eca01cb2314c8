use idlink::auth::TokenKind;
use idlink::errors::ErrorCode;
use idlink::models::{
    account::AccountInput,
    auth_token::{AppTokenRequest, Credentials},
};
use idlink::scopes::{self, EffectiveScopes};

#[path = "common.rs"]
mod common;

fn codes(err: idlink::errors::ServiceError) -> Vec<ErrorCode> {
    err.validation().expect("validation failure").codes().collect()
}

fn credentials(email: &str, password: &str) -> Credentials {
    Credentials {
        email: Some(email.into()),
        password: Some(password.into()),
    }
}

#[tokio::test]
async fn user_token_carries_root_scopes_and_full_profile() {
    let env = common::init_test_env().expect("init env");
    let ada = common::create_user(&env, common::ada()).await;

    let issued = env
        .state
        .tokens
        .issue_for_user(credentials("ada@x.com", "analytical-engine"))
        .await
        .unwrap();
    assert_eq!(issued.kind, TokenKind::User);
    assert_eq!(issued.scopes, EffectiveScopes::Root);
    assert!(issued.app.is_none());

    let resolved = env.state.tokens.resolve(&issued.id).await.unwrap().expect("resolves");
    assert_eq!(resolved.kind, TokenKind::User);
    assert_eq!(resolved.user, ada);
    assert!(resolved.scopes.allows(scopes::PHONE));
}

#[tokio::test]
async fn sign_in_failures_are_reported_by_code() {
    let env = common::init_test_env().expect("init env");
    common::create_user(&env, common::ada()).await;

    let err = env.state.tokens.issue_for_user(Credentials::default()).await.unwrap_err();
    assert_eq!(codes(err), vec![ErrorCode::UserEmailRequired, ErrorCode::UserPasswordRequired]);

    let err = env
        .state
        .tokens
        .issue_for_user(credentials("grace@x.com", "analytical-engine"))
        .await
        .unwrap_err();
    assert_eq!(codes(err), vec![ErrorCode::UserEmailInexistent]);

    let err = env
        .state
        .tokens
        .issue_for_user(credentials("ada@x.com", "difference-engine"))
        .await
        .unwrap_err();
    assert_eq!(codes(err), vec![ErrorCode::UserPasswordWrong]);
}

#[tokio::test]
async fn app_token_sees_only_granted_fields() {
    let env = common::init_test_env().expect("init env");
    let ada = common::create_user(&env, common::ada()).await;
    let charles = common::create_user(&env, common::user_input("Charles", "Babbage", "charles@x.com")).await;
    let app = common::create_app(
        &env,
        &charles,
        common::app_input("Engine", "https://engine.example.com", &[scopes::NAME_FIRST, scopes::BIRTHDAY]),
    )
    .await;
    env.state
        .accounts
        .create(AccountInput { app: Some(app.id.clone()) }, &ada)
        .await
        .unwrap();

    let issued = env
        .state
        .tokens
        .issue_for_app(AppTokenRequest { app: Some(app.id.clone()) }, &ada)
        .await
        .unwrap();
    assert_eq!(issued.kind, TokenKind::App);

    let resolved = env.state.tokens.resolve(&issued.id).await.unwrap().expect("resolves");
    assert_eq!(resolved.kind, TokenKind::App);
    assert_eq!(resolved.app.as_ref().map(|a| a.id.as_str()), Some(app.id.as_str()));
    assert_eq!(resolved.user.id, ada.id);
    assert_eq!(resolved.user.name.first, "Ada");
    assert_eq!(resolved.user.name.last, "");
    assert_eq!(resolved.user.email, "");
    assert_eq!(resolved.user.birthday.as_deref(), Some("1815-12-10"));
    assert_eq!(resolved.user.phone, None);
    assert!(resolved.scopes.allows(scopes::NAME_FIRST));
    assert!(!resolved.scopes.allows(scopes::EMAIL));
}

#[tokio::test]
async fn app_token_requires_an_existing_app() {
    let env = common::init_test_env().expect("init env");
    let ada = common::create_user(&env, common::ada()).await;

    let err = env
        .state
        .tokens
        .issue_for_app(AppTokenRequest::default(), &ada)
        .await
        .unwrap_err();
    assert_eq!(codes(err), vec![ErrorCode::TokenAppRequired]);

    let err = env
        .state
        .tokens
        .issue_for_app(AppTokenRequest { app: Some("missing".into()) }, &ada)
        .await
        .unwrap_err();
    assert_eq!(codes(err), vec![ErrorCode::AppInexistent]);
}

#[tokio::test]
async fn unknown_deleted_and_signed_out_tokens_do_not_resolve() {
    let env = common::init_test_env().expect("init env");
    let ada = common::create_user(&env, common::ada()).await;
    let charles = common::create_user(&env, common::user_input("Charles", "Babbage", "charles@x.com")).await;
    let app = common::create_app(&env, &charles, common::app_input("Engine", "https://engine.example.com", &[scopes::NAME])).await;

    assert!(env.state.tokens.resolve("").await.unwrap().is_none());
    assert!(env.state.tokens.resolve("idl_tok_nope").await.unwrap().is_none());

    let session = env
        .state
        .tokens
        .issue_for_user(credentials("ada@x.com", "analytical-engine"))
        .await
        .unwrap();
    env.state.tokens.delete(&session.id).await.unwrap();
    assert!(env.state.tokens.resolve(&session.id).await.unwrap().is_none());
    env.state.tokens.delete(&session.id).await.unwrap();

    let delegated = env
        .state
        .tokens
        .issue_for_app(AppTokenRequest { app: Some(app.id.clone()) }, &ada)
        .await
        .unwrap();
    env.state.apps.delete(&app).await.unwrap();
    assert!(env.state.tokens.resolve(&delegated.id).await.unwrap().is_none());

    let second = env
        .state
        .tokens
        .issue_for_user(credentials("ada@x.com", "analytical-engine"))
        .await
        .unwrap();
    env.state.users.delete(&ada).await.unwrap();
    assert!(env.state.tokens.resolve(&second.id).await.unwrap().is_none());
}
