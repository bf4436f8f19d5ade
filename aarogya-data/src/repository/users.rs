use async_trait::async_trait;
use chrono::Utc;
use rusqlite::Row;
use tracing::debug;
use uuid::Uuid;

use crate::database::get_db_pool;
use crate::models::user::{CreateUserRecord, UserRecord};
use super::errors::RepositoryError;

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// Create a new user from a request
    async fn create(&self, request: CreateUserRecord) -> Result<UserRecord, RepositoryError>;

    /// Find a user by phone number
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<UserRecord>, RepositoryError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, RepositoryError>;

    /// Mark a user's phone number as verified. Returns false if no such user exists.
    async fn mark_verified(&self, phone_number: &str) -> Result<bool, RepositoryError>;

    /// Record a successful login
    async fn update_last_login(&self, id: &str) -> Result<(), RepositoryError>;

    /// Count users, optionally restricted to one role
    async fn count(&self, role: Option<&str>) -> Result<usize, RepositoryError>;

    /// List users, optionally restricted to one role, capped at `limit`
    async fn list(&self, role: Option<&str>, limit: usize) -> Result<Vec<UserRecord>, RepositoryError>;

    /// List patients registered in a given village
    async fn list_village_patients(&self, village: &str) -> Result<Vec<UserRecord>, RepositoryError>;
}

const USER_COLUMNS: &str = "id, phone_number, email, password_hash, full_name, date_of_birth, \
     gender, role, village, district, state, pincode, preferred_language, emergency_contact, \
     is_active, is_verified, created_at, updated_at, last_login";

fn map_user_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        phone_number: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        full_name: row.get(4)?,
        date_of_birth: row.get(5)?,
        gender: row.get(6)?,
        role: row.get(7)?,
        village: row.get(8)?,
        district: row.get(9)?,
        state: row.get(10)?,
        pincode: row.get(11)?,
        preferred_language: row.get(12)?,
        emergency_contact: row.get(13)?,
        is_active: row.get::<_, i64>(14)? != 0,
        is_verified: row.get::<_, i64>(15)? != 0,
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
        last_login: row.get(18)?,
    })
}

/// SQLite-backed repository for user accounts
#[derive(Debug, Clone, Default)]
pub struct UserRepository;

impl UserRepository {
    /// Create a new repository
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create(&self, request: CreateUserRecord) -> Result<UserRecord, RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        let now = Utc::now().to_rfc3339();
        let user = UserRecord {
            id: Uuid::new_v4().to_string(),
            phone_number: request.phone_number,
            email: request.email,
            password_hash: request.password_hash,
            full_name: request.full_name,
            date_of_birth: request.date_of_birth,
            gender: request.gender,
            role: request.role,
            village: request.village,
            district: request.district,
            state: request.state,
            pincode: request.pincode,
            preferred_language: request.preferred_language,
            emergency_contact: request.emergency_contact,
            is_active: true,
            is_verified: false,
            created_at: now.clone(),
            updated_at: now,
            last_login: None,
        };

        debug!("Creating user {}", user.id);

        let result = conn.execute(
            "INSERT INTO users (id, phone_number, email, password_hash, full_name, date_of_birth, \
             gender, role, village, district, state, pincode, preferred_language, emergency_contact, \
             is_active, is_verified, created_at, updated_at, last_login) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
            rusqlite::params![
                user.id,
                user.phone_number,
                user.email,
                user.password_hash,
                user.full_name,
                user.date_of_birth,
                user.gender,
                user.role,
                user.village,
                user.district,
                user.state,
                user.pincode,
                user.preferred_language,
                user.emergency_contact,
                user.is_active as i64,
                user.is_verified as i64,
                user.created_at,
                user.updated_at,
                user.last_login,
            ],
        );

        match result {
            Ok(_) => Ok(user),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(RepositoryError::Conflict(
                    "Phone number already registered".to_string(),
                ))
            }
            Err(e) => Err(RepositoryError::Sqlite(e)),
        }
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users WHERE phone_number = ?1",
            USER_COLUMNS
        ))?;

        match stmt.query_row([phone_number], map_user_row) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(RepositoryError::Sqlite(e)),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        let mut stmt = conn.prepare(&format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS))?;

        match stmt.query_row([id], map_user_row) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(RepositoryError::Sqlite(e)),
        }
    }

    async fn mark_verified(&self, phone_number: &str) -> Result<bool, RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        let updated = conn.execute(
            "UPDATE users SET is_verified = 1, updated_at = ?1 WHERE phone_number = ?2",
            rusqlite::params![Utc::now().to_rfc3339(), phone_number],
        )?;

        Ok(updated > 0)
    }

    async fn update_last_login(&self, id: &str) -> Result<(), RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        conn.execute(
            "UPDATE users SET last_login = ?1 WHERE id = ?2",
            rusqlite::params![Utc::now().to_rfc3339(), id],
        )?;

        Ok(())
    }

    async fn count(&self, role: Option<&str>) -> Result<usize, RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        let total: i64 = match role {
            Some(role) => conn.query_row(
                "SELECT COUNT(*) FROM users WHERE role = ?1",
                [role],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?,
        };

        Ok(total as usize)
    }

    async fn list(&self, role: Option<&str>, limit: usize) -> Result<Vec<UserRecord>, RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        let mut result = Vec::new();

        match role {
            Some(role) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM users WHERE role = ?1 ORDER BY created_at DESC LIMIT ?2",
                    USER_COLUMNS
                ))?;
                let rows = stmt.query_map(rusqlite::params![role, limit as i64], map_user_row)?;
                for user in rows {
                    result.push(user?);
                }
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM users ORDER BY created_at DESC LIMIT ?1",
                    USER_COLUMNS
                ))?;
                let rows = stmt.query_map([limit as i64], map_user_row)?;
                for user in rows {
                    result.push(user?);
                }
            }
        }

        Ok(result)
    }

    async fn list_village_patients(&self, village: &str) -> Result<Vec<UserRecord>, RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users WHERE role = 'patient' AND village = ?1",
            USER_COLUMNS
        ))?;

        let rows = stmt.query_map([village], map_user_row)?;

        let mut result = Vec::new();
        for user in rows {
            result.push(user?);
        }

        Ok(result)
    }
}

/// Mock user repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// In-memory implementation of UserRepositoryTrait for testing
    #[derive(Default)]
    pub struct MockUserRepository {
        users: Mutex<Vec<UserRecord>>,
    }

    impl MockUserRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with predefined users
        pub fn with_users(users: Vec<UserRecord>) -> Self {
            Self {
                users: Mutex::new(users),
            }
        }
    }

    #[async_trait]
    impl UserRepositoryTrait for MockUserRepository {
        async fn create(&self, request: CreateUserRecord) -> Result<UserRecord, RepositoryError> {
            let mut users = self.users.lock()?;

            if users.iter().any(|u| u.phone_number == request.phone_number) {
                return Err(RepositoryError::Conflict(
                    "Phone number already registered".to_string(),
                ));
            }

            let now = Utc::now().to_rfc3339();
            let user = UserRecord {
                id: Uuid::new_v4().to_string(),
                phone_number: request.phone_number,
                email: request.email,
                password_hash: request.password_hash,
                full_name: request.full_name,
                date_of_birth: request.date_of_birth,
                gender: request.gender,
                role: request.role,
                village: request.village,
                district: request.district,
                state: request.state,
                pincode: request.pincode,
                preferred_language: request.preferred_language,
                emergency_contact: request.emergency_contact,
                is_active: true,
                is_verified: false,
                created_at: now.clone(),
                updated_at: now,
                last_login: None,
            };

            users.push(user.clone());
            Ok(user)
        }

        async fn find_by_phone(&self, phone_number: &str) -> Result<Option<UserRecord>, RepositoryError> {
            let users = self.users.lock()?;
            Ok(users.iter().find(|u| u.phone_number == phone_number).cloned())
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, RepositoryError> {
            let users = self.users.lock()?;
            Ok(users.iter().find(|u| u.id == id).cloned())
        }

        async fn mark_verified(&self, phone_number: &str) -> Result<bool, RepositoryError> {
            let mut users = self.users.lock()?;
            match users.iter_mut().find(|u| u.phone_number == phone_number) {
                Some(user) => {
                    user.is_verified = true;
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn update_last_login(&self, id: &str) -> Result<(), RepositoryError> {
            let mut users = self.users.lock()?;
            if let Some(user) = users.iter_mut().find(|u| u.id == id) {
                user.last_login = Some(Utc::now().to_rfc3339());
            }
            Ok(())
        }

        async fn count(&self, role: Option<&str>) -> Result<usize, RepositoryError> {
            let users = self.users.lock()?;
            Ok(match role {
                Some(role) => users.iter().filter(|u| u.role == role).count(),
                None => users.len(),
            })
        }

        async fn list(&self, role: Option<&str>, limit: usize) -> Result<Vec<UserRecord>, RepositoryError> {
            let users = self.users.lock()?;
            Ok(users
                .iter()
                .filter(|u| role.map_or(true, |r| u.role == r))
                .take(limit)
                .cloned()
                .collect())
        }

        async fn list_village_patients(&self, village: &str) -> Result<Vec<UserRecord>, RepositoryError> {
            let users = self.users.lock()?;
            Ok(users
                .iter()
                .filter(|u| u.role == "patient" && u.village.as_deref() == Some(village))
                .cloned()
                .collect())
        }
    }

    fn sample_request(phone: &str) -> CreateUserRecord {
        CreateUserRecord {
            phone_number: phone.to_string(),
            email: None,
            password_hash: "hash".to_string(),
            full_name: "Test User".to_string(),
            date_of_birth: None,
            gender: None,
            role: "patient".to_string(),
            village: Some("Rampur".to_string()),
            district: None,
            state: None,
            pincode: None,
            preferred_language: "hi".to_string(),
            emergency_contact: None,
        }
    }

    #[cfg(test)]
    #[tokio::test]
    async fn test_mock_create_and_find() {
        let repo = MockUserRepository::new();
        let user = repo.create(sample_request("9876543210")).await.unwrap();

        let found = repo.find_by_phone("9876543210").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(!found.is_verified);

        assert!(repo.find_by_phone("9999999999").await.unwrap().is_none());
    }

    #[cfg(test)]
    #[tokio::test]
    async fn test_mock_duplicate_phone_conflict() {
        let repo = MockUserRepository::new();
        repo.create(sample_request("9876543210")).await.unwrap();

        let err = repo.create(sample_request("9876543210")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[cfg(test)]
    #[tokio::test]
    async fn test_mock_mark_verified() {
        let repo = MockUserRepository::new();
        repo.create(sample_request("9876543210")).await.unwrap();

        assert!(repo.mark_verified("9876543210").await.unwrap());
        assert!(!repo.mark_verified("9999999999").await.unwrap());

        let user = repo.find_by_phone("9876543210").await.unwrap().unwrap();
        assert!(user.is_verified);
    }

    #[cfg(test)]
    #[tokio::test]
    async fn test_mock_village_patients() {
        let repo = MockUserRepository::new();
        repo.create(sample_request("9876543210")).await.unwrap();

        let mut other = sample_request("9876543211");
        other.village = Some("Sitapur".to_string());
        repo.create(other).await.unwrap();

        let patients = repo.list_village_patients("Rampur").await.unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].phone_number, "9876543210");
    }
}
