use rusqlite::Connection;

/// Initialize the license database schema
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- License codes minted by administrators
        -- used_by / used_at stay NULL until the code is redeemed (exactly once)
        CREATE TABLE IF NOT EXISTS license_codes (
            code TEXT PRIMARY KEY,
            type TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            used_by TEXT,
            used_at INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_license_codes_unused ON license_codes(code) WHERE used_by IS NULL;

        -- Current license per user (replaced wholesale on each redemption)
        -- expires_at NULL = permanent
        CREATE TABLE IF NOT EXISTS licenses (
            user_id TEXT PRIMARY KEY,
            code TEXT NOT NULL REFERENCES license_codes(code),
            type_label TEXT NOT NULL,
            activated_at INTEGER NOT NULL,
            expires_at INTEGER
        );
        "#,
    )
}
