use idlink::errors::ErrorCode;
use idlink::models::{
    account::AccountInput,
    application::{AppInput, AppUpdate, WebhookInput},
};
use idlink::repos::IdentityRepo;
use idlink::scopes;

#[path = "common.rs"]
mod common;

fn codes(err: idlink::errors::ServiceError) -> Vec<ErrorCode> {
    err.validation().expect("validation failure").codes().collect()
}

#[tokio::test]
async fn app_creation_validates_every_field() {
    let env = common::init_test_env().expect("init env");
    let ada = common::create_user(&env, common::ada()).await;

    let err = env.state.apps.create(&ada, AppInput::default()).await.unwrap_err();
    assert_eq!(
        codes(err),
        vec![ErrorCode::AppNameRequired, ErrorCode::AppUrlRequired, ErrorCode::AppScopesRequired]
    );

    let input = common::with_webhook(
        common::app_input("Engine", "ftp://engine.example.com", &[scopes::NAME, "user.shoe"]),
        "not a url",
    );
    let err = env.state.apps.create(&ada, input).await.unwrap_err();
    assert_eq!(
        codes(err),
        vec![ErrorCode::AppUrlInvalid, ErrorCode::AppScopesInvalid, ErrorCode::AppWebhookUrlInvalid]
    );

    let err = env
        .state
        .apps
        .create(&ada, common::app_input("Engine", "https://engine.example.com", &[]))
        .await
        .unwrap_err();
    assert_eq!(codes(err), vec![ErrorCode::AppScopesRequired]);
}

#[tokio::test]
async fn app_is_created_with_credentials_and_scopes() {
    let env = common::init_test_env().expect("init env");
    let ada = common::create_user(&env, common::ada()).await;

    let input = common::app_input("Engine", "https://engine.example.com", &[scopes::NAME, scopes::EMAIL, scopes::NAME]);
    let app = common::create_app(&env, &ada, input).await;
    assert_eq!(app.owner, ada.id);
    assert!(app.api.key.starts_with("idl_key_"));
    assert!(app.api.webhook.signature.starts_with("idl_whsec_"));
    assert_ne!(app.api.key, app.api.webhook.signature);
    assert!(env.state.apps.is_owned_by(&app, &ada));

    let fetched = env.state.apps.retrieve(&app.id).await.unwrap().expect("stored");
    let values: Vec<_> = fetched.granted_scopes().iter().map(|s| s.value.as_str()).collect();
    assert_eq!(values, vec![scopes::EMAIL, scopes::NAME]);

    let listed = env.state.apps.list(&ada).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].scopes.is_none());

    let found = env.state.apps.with_url("https://engine.example.com").await.unwrap();
    assert_eq!(found.map(|a| a.id), Some(app.id));
}

#[tokio::test]
async fn app_url_must_be_unique() {
    let env = common::init_test_env().expect("init env");
    let ada = common::create_user(&env, common::ada()).await;
    let charles = common::create_user(&env, common::user_input("Charles", "Babbage", "charles@x.com")).await;

    common::create_app(&env, &ada, common::app_input("Engine", "https://engine.example.com", &[scopes::NAME])).await;
    let err = env
        .state
        .apps
        .create(&charles, common::app_input("Copy", "https://engine.example.com", &[scopes::NAME]))
        .await
        .unwrap_err();
    assert_eq!(codes(err), vec![ErrorCode::AppUrlAlreadyExists]);
}

#[tokio::test]
async fn app_url_variants_collide() {
    let env = common::init_test_env().expect("init env");
    let ada = common::create_user(&env, common::ada()).await;
    let charles = common::create_user(&env, common::user_input("Charles", "Babbage", "charles@x.com")).await;

    let app = common::create_app(&env, &ada, common::app_input("Engine", "https://engine.example.com", &[scopes::NAME])).await;
    assert_eq!(app.url, "https://engine.example.com/");

    for variant in ["https://ENGINE.example.com", "https://engine.example.com/", " https://Engine.Example.com/ "] {
        let err = env
            .state
            .apps
            .create(&charles, common::app_input("Copy", variant, &[scopes::NAME]))
            .await
            .unwrap_err();
        assert_eq!(codes(err), vec![ErrorCode::AppUrlAlreadyExists], "{variant}");

        let found = env.state.apps.with_url(variant).await.unwrap();
        assert_eq!(found.map(|a| a.id), Some(app.id.clone()), "{variant}");
    }
    assert!(env.state.apps.list(&charles).await.unwrap().is_empty());
}

#[tokio::test]
async fn webhook_urls_are_stored_normalized() {
    let env = common::init_test_env().expect("init env");
    let ada = common::create_user(&env, common::ada()).await;

    let input = common::with_webhook(
        common::app_input("Engine", "https://engine.example.com", &[scopes::NAME]),
        "  HTTPS://Engine.Example.com/hooks  ",
    );
    let app = common::create_app(&env, &ada, input).await;
    assert_eq!(app.api.webhook.url.as_deref(), Some("https://engine.example.com/hooks"));

    let partial = AppUpdate {
        webhook: Some(WebhookInput { url: Some(" https://ENGINE.example.com ".into()) }),
    };
    let updated = env.state.apps.update(&app, partial).await.unwrap();
    assert_eq!(updated.api.webhook.url.as_deref(), Some("https://engine.example.com/"));
}

#[tokio::test]
async fn only_the_webhook_url_is_updated() {
    let env = common::init_test_env().expect("init env");
    let ada = common::create_user(&env, common::ada()).await;
    let app = common::create_app(&env, &ada, common::app_input("Engine", "https://engine.example.com", &[scopes::NAME])).await;

    let partial = AppUpdate {
        webhook: Some(WebhookInput { url: Some("https://engine.example.com/hooks".into()) }),
    };
    let updated = env.state.apps.update(&app, partial).await.unwrap();
    assert_eq!(updated.api.webhook.url.as_deref(), Some("https://engine.example.com/hooks"));
    assert_eq!(updated.name, app.name);
    assert_eq!(updated.api.key, app.api.key);
    assert_eq!(updated.scopes, app.scopes);

    let bad = AppUpdate { webhook: Some(WebhookInput { url: Some("nope".into()) }) };
    let err = env.state.apps.update(&app, bad).await.unwrap_err();
    assert_eq!(codes(err), vec![ErrorCode::AppWebhookUrlInvalid]);

    let untouched = env.state.apps.update(&updated, AppUpdate::default()).await.unwrap();
    assert_eq!(untouched.api.webhook.url, updated.api.webhook.url);
}

#[tokio::test]
async fn accounts_link_once_per_app() {
    let env = common::init_test_env().expect("init env");
    let ada = common::create_user(&env, common::ada()).await;
    let charles = common::create_user(&env, common::user_input("Charles", "Babbage", "charles@x.com")).await;
    let engine = common::create_app(&env, &charles, common::app_input("Engine", "https://engine.example.com", &[scopes::NAME])).await;
    let notes = common::create_app(&env, &charles, common::app_input("Notes", "https://notes.example.com", &[scopes::EMAIL])).await;

    let linked = env
        .state
        .accounts
        .create(AccountInput { app: Some(engine.id.clone()) }, &ada)
        .await
        .unwrap();
    assert_eq!(linked.account.user, ada.id);
    assert_eq!(linked.app.id, engine.id);
    assert!(env.state.accounts.exists(&ada, &engine).await.unwrap());

    let err = env
        .state
        .accounts
        .create(AccountInput { app: Some(engine.id.clone()) }, &ada)
        .await
        .unwrap_err();
    assert_eq!(codes(err), vec![ErrorCode::AccountAlreadyExists]);

    env.state
        .accounts
        .create(AccountInput { app: Some(notes.id.clone()) }, &ada)
        .await
        .expect("second app links");
    assert_eq!(env.state.accounts.list(&ada).await.unwrap().len(), 2);
    assert_eq!(env.state.accounts.for_app(&engine).await.unwrap().len(), 1);

    let err = env.state.accounts.create(AccountInput::default(), &ada).await.unwrap_err();
    assert_eq!(codes(err), vec![ErrorCode::AccountAppRequired]);

    let err = env
        .state
        .accounts
        .create(AccountInput { app: Some("missing".into()) }, &ada)
        .await
        .unwrap_err();
    assert_eq!(codes(err), vec![ErrorCode::AppInexistent]);
}

#[tokio::test]
async fn accounts_are_only_visible_to_their_user() {
    let env = common::init_test_env().expect("init env");
    let ada = common::create_user(&env, common::ada()).await;
    let charles = common::create_user(&env, common::user_input("Charles", "Babbage", "charles@x.com")).await;
    let engine = common::create_app(&env, &charles, common::app_input("Engine", "https://engine.example.com", &[scopes::NAME])).await;

    let linked = env
        .state
        .accounts
        .create(AccountInput { app: Some(engine.id.clone()) }, &ada)
        .await
        .unwrap();

    let own = env.state.accounts.retrieve(&ada, &linked.account.id).await.unwrap();
    assert_eq!(own.map(|l| l.app.id), Some(engine.id.clone()));
    assert!(env.state.accounts.retrieve(&charles, &linked.account.id).await.unwrap().is_none());

    env.state.accounts.delete(&linked.account).await.unwrap();
    assert!(!env.state.accounts.exists(&ada, &engine).await.unwrap());
    env.state.accounts.delete(&linked.account).await.unwrap();
}

#[tokio::test]
async fn deleting_an_app_removes_scopes_and_accounts() {
    let env = common::init_test_env().expect("init env");
    let ada = common::create_user(&env, common::ada()).await;
    let charles = common::create_user(&env, common::user_input("Charles", "Babbage", "charles@x.com")).await;
    let engine = common::create_app(&env, &charles, common::app_input("Engine", "https://engine.example.com", &[scopes::NAME])).await;
    env.state
        .accounts
        .create(AccountInput { app: Some(engine.id.clone()) }, &ada)
        .await
        .unwrap();

    env.state.apps.delete(&engine).await.unwrap();

    assert!(env.state.apps.retrieve(&engine.id).await.unwrap().is_none());
    assert!(env.repo.list_app_scopes(&engine.id).await.unwrap().is_empty());
    assert!(env.state.accounts.list(&ada).await.unwrap().is_empty());
    assert!(env.state.accounts.linked(&ada).await.unwrap().is_empty());
}
