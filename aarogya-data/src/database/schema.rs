use rusqlite::Connection;
use tracing::info;

/// Create all tables and indexes if they do not exist yet
pub fn create_schema(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite schema setup");

    create_users_table(conn)?;
    create_health_records_table(conn)?;
    create_appointments_table(conn)?;
    create_emergency_alerts_table(conn)?;
    create_communication_logs_table(conn)?;

    info!("SQLite schema setup completed successfully");
    Ok(())
}

fn create_users_table(conn: &Connection) -> Result<(), String> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            phone_number TEXT NOT NULL UNIQUE,
            email TEXT,
            password_hash TEXT NOT NULL,
            full_name TEXT NOT NULL,
            date_of_birth TEXT,
            gender TEXT,
            role TEXT NOT NULL DEFAULT 'patient',
            village TEXT,
            district TEXT,
            state TEXT,
            pincode TEXT,
            preferred_language TEXT NOT NULL DEFAULT 'hi',
            emergency_contact TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_verified INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            last_login TEXT
        )",
        [],
    )
    .map_err(|e| e.to_string())?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_users_phone_number ON users (phone_number)",
        [],
    )
    .map_err(|e| format!("Failed to create index: {}", e))?;

    Ok(())
}

fn create_health_records_table(conn: &Connection) -> Result<(), String> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS health_records (
            id TEXT PRIMARY KEY,
            patient_id TEXT NOT NULL REFERENCES users (id),
            recorded_by TEXT REFERENCES users (id),
            systolic INTEGER,
            diastolic INTEGER,
            heart_rate INTEGER,
            temperature REAL,
            weight REAL,
            height REAL,
            oxygen_saturation REAL,
            symptoms TEXT,
            diagnosis TEXT,
            medications TEXT,
            notes TEXT,
            risk_score REAL,
            risk_level TEXT,
            recommendations TEXT,
            recorded_at TEXT NOT NULL
        )",
        [],
    )
    .map_err(|e| e.to_string())?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_health_records_patient
         ON health_records (patient_id, recorded_at DESC)",
        [],
    )
    .map_err(|e| format!("Failed to create index: {}", e))?;

    Ok(())
}

fn create_appointments_table(conn: &Connection) -> Result<(), String> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS appointments (
            id TEXT PRIMARY KEY,
            patient_id TEXT NOT NULL REFERENCES users (id),
            asha_worker_id TEXT REFERENCES users (id),
            appointment_date TEXT NOT NULL,
            appointment_type TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'scheduled',
            location TEXT,
            notes TEXT,
            reminder_sent INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
        [],
    )
    .map_err(|e| e.to_string())?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_appointments_date
         ON appointments (appointment_date)",
        [],
    )
    .map_err(|e| format!("Failed to create index: {}", e))?;

    Ok(())
}

fn create_emergency_alerts_table(conn: &Connection) -> Result<(), String> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS emergency_alerts (
            id TEXT PRIMARY KEY,
            patient_id TEXT NOT NULL REFERENCES users (id),
            alert_type TEXT NOT NULL,
            severity TEXT NOT NULL,
            description TEXT,
            location_lat REAL,
            location_lng REAL,
            address TEXT,
            status TEXT NOT NULL DEFAULT 'active',
            responder_id TEXT REFERENCES users (id),
            response_time TEXT,
            created_at TEXT NOT NULL,
            resolved_at TEXT
        )",
        [],
    )
    .map_err(|e| e.to_string())?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_emergency_alerts_created
         ON emergency_alerts (created_at DESC)",
        [],
    )
    .map_err(|e| format!("Failed to create index: {}", e))?;

    Ok(())
}

fn create_communication_logs_table(conn: &Connection) -> Result<(), String> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS communication_logs (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users (id),
            channel TEXT NOT NULL,
            recipient TEXT NOT NULL,
            message TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            sent_at TEXT NOT NULL,
            delivered_at TEXT,
            external_id TEXT
        )",
        [],
    )
    .map_err(|e| e.to_string())?;

    Ok(())
}
