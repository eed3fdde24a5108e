//! `navigator sessions`: inspect saved sessions on disk.

use navigator_config::AppConfig;
use navigator_core::session::{Session, SessionId, SessionStore};
use navigator_sessions::FileSessionStore;

fn open_store(config: &AppConfig) -> FileSessionStore {
    FileSessionStore::new(&config.sessions.dir)
        .with_skip_malformed(config.sessions.skip_malformed)
        .with_io_timeout(config.sessions.io_timeout())
}

/// Sessions ordered newest first.
fn newest_first(sessions: impl IntoIterator<Item = Session>) -> Vec<Session> {
    let mut sessions: Vec<Session> = sessions.into_iter().collect();
    sessions.sort_by(|a, b| b.id.cmp(&a.id));
    sessions
}

pub async fn list(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config);
    let sessions = newest_first(store.list().await?.into_values());

    println!("💾 Saved Sessions ({})", store.dir().display());
    println!("==================");
    if sessions.is_empty() {
        println!("  (none)");
        return Ok(());
    }

    for session in &sessions {
        println!(
            "  {:<15} {:>3} msgs  {}",
            session.id,
            session.messages.len(),
            session.title(config.sessions.title_max_length)
        );
    }

    Ok(())
}

pub async fn show(config: &AppConfig, id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config);
    let id = SessionId(id);
    match store.get(id).await? {
        Some(session) => {
            println!("{}", serde_json::to_string_pretty(&session)?);
            Ok(())
        }
        None => Err(format!("Session {id} not found").into()),
    }
}

pub async fn delete(config: &AppConfig, id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config);
    let id = SessionId(id);
    if store.delete(id).await? {
        println!("🗑️  Deleted session {id}");
        Ok(())
    } else {
        Err(format!("Session {id} not found").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: i64) -> Session {
        Session {
            id: SessionId(id),
            created_at: "2025-01-05T15:07:00Z".into(),
            messages: Vec::new(),
        }
    }

    #[test]
    fn newest_first_orders_by_id_descending() {
        let ordered = newest_first(vec![session(2), session(30), session(7)]);
        let ids: Vec<i64> = ordered.iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![30, 7, 2]);
    }

    #[tokio::test]
    async fn delete_missing_session_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.sessions.dir = tmp.path().to_path_buf();

        assert!(delete(&config, 5).await.is_err());
    }

    #[tokio::test]
    async fn show_and_delete_existing_session() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.sessions.dir = tmp.path().to_path_buf();

        let created = open_store(&config).create().await.unwrap();
        show(&config, created.id.0).await.unwrap();
        delete(&config, created.id.0).await.unwrap();
        assert!(open_store(&config).get(created.id).await.unwrap().is_none());
    }
}
