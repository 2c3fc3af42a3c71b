//! Round trip against a real Postgres. Run with
//! `DATABASE_URL=postgres://... cargo test -- --ignored`.

use std::sync::Arc;

use pagekeeper::{
    auth::{Credentials, PasswordHasher, TokenHasher},
    users::{PgUserDb, User, UserError, UserService},
};

async fn testing_user_service() -> (UserService, PgUserDb) {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = PgUserDb::connect(&url).await.expect("connect");
    db.auto_migrate().await.expect("migrate");
    db.destructive_reset().await.expect("reset");
    let credentials = Credentials {
        passwords: PasswordHasher::new("lets-go-red-wings", 4),
        tokens: TokenHasher::new("go-green-go-white").unwrap(),
    };
    (UserService::new(Arc::new(db.clone()), credentials), db)
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn create_lookup_update_delete() {
    let (us, db) = testing_user_service().await;

    let mut vinny = User::new("Vinny", "vinny@gmail.com", "vinny-password");
    let mut ashley = User::new("Ashley", "ashley@gmail.com", "ashley-password");
    us.create(&mut vinny).await.unwrap();
    us.create(&mut ashley).await.unwrap();

    let got = us.by_id(1).await.unwrap();
    assert_eq!(got.name, "Vinny");
    assert!(time::OffsetDateTime::now_utc() - got.created_at < time::Duration::seconds(5));
    assert!(got.password.is_empty());
    assert!(got.remember.is_empty());
    assert_ne!(got.remember_hash, vinny.remember);

    let by_email = us.by_email("vinny@gmail.com").await.unwrap();
    assert_eq!(by_email.id, 1);
    let authed = us.authenticate("vinny@gmail.com", "vinny-password").await.unwrap();
    assert_eq!(authed.email, "vinny@gmail.com");
    assert!(matches!(
        us.authenticate("vinny@gmail.com", "nope-nope").await,
        Err(UserError::InvalidPassword)
    ));

    assert_eq!(us.by_remember(&vinny.remember).await.unwrap().id, 1);

    assert!(matches!(us.by_id(100).await, Err(UserError::NotFound)));
    assert!(matches!(
        us.by_email("imnotreal@test.io").await,
        Err(UserError::NotFound)
    ));

    let mut update = us.by_id(1).await.unwrap();
    update.email = "Vinny2@gmail.com".into();
    us.update(&mut update).await.unwrap();
    assert_eq!(us.by_email("vinny2@gmail.com").await.unwrap().id, 1);

    let mut clash = us.by_id(2).await.unwrap();
    clash.email = "vinny2@gmail.com".into();
    assert!(matches!(us.update(&mut clash).await, Err(UserError::EmailTaken)));

    assert!(matches!(us.delete(0).await, Err(UserError::InvalidId)));
    us.delete(1).await.unwrap();
    assert!(matches!(us.by_id(1).await, Err(UserError::NotFound)));

    db.close().await;
}
