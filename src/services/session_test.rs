use super::*;

#[test]
fn bytes_to_hex_encodes_lowercase_pairs() {
    assert_eq!(bytes_to_hex(&[0x00, 0xff, 0x4a]), "00ff4a");
    assert_eq!(bytes_to_hex(&[]), "");
}

#[test]
fn session_tokens_are_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn ws_tickets_are_32_hex_chars() {
    let ticket = generate_ws_ticket();
    assert_eq!(ticket.len(), 32);
    assert!(ticket.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn tokens_are_unique() {
    let a = generate_token();
    let b = generate_token();
    assert_ne!(a, b);
}

#[test]
fn session_user_serializes_without_password_fields() {
    let user = SessionUser {
        id: uuid::Uuid::new_v4(),
        email: "driver@fleet.test".into(),
        name: "Driver".into(),
    };
    let json = serde_json::to_value(&user).expect("serialize");
    let map = json.as_object().expect("object");
    assert_eq!(map.len(), 3);
    assert!(map.contains_key("id"));
    assert!(map.contains_key("email"));
    assert!(map.contains_key("name"));
}

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    async fn live_pool() -> sqlx::PgPool {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL required");
        PgPoolOptions::new().connect(&url).await.expect("connect")
    }

    #[tokio::test]
    async fn ticket_is_single_use() {
        let pool = live_pool().await;
        let user_id = uuid::Uuid::new_v4();
        sqlx::query("INSERT INTO users (id, email, name, password_hash) VALUES ($1, $2, 'T', 'x')")
            .bind(user_id)
            .bind(format!("{user_id}@test"))
            .execute(&pool)
            .await
            .expect("seed user");

        let ticket = create_ws_ticket(&pool, user_id).await.expect("create ticket");
        assert_eq!(consume_ws_ticket(&pool, &ticket).await.expect("first use"), Some(user_id));
        assert_eq!(consume_ws_ticket(&pool, &ticket).await.expect("second use"), None);
    }
}
