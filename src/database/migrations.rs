use tokio_postgres::Client;

// Creates the message log table. The log is append-only; `seq` records
// arrival order and breaks ties between equal timestamps.
pub async fn apply_migrations(client: &Client) -> Result<(), String> {
    let enable_uuid_extension_query = "CREATE EXTENSION IF NOT EXISTS \"uuid-ossp\"";
    client
        .execute(enable_uuid_extension_query, &[])
        .await
        .map_err(|e| format!("Error enabling uuid-ossp extension: {}", e))?;

    let create_conversations_table_query = "
        CREATE TABLE IF NOT EXISTS conversations (
            id UUID DEFAULT uuid_generate_v4() PRIMARY KEY,
            seq BIGSERIAL NOT NULL,
            text TEXT NOT NULL,
            translated_text TEXT NOT NULL,
            audio_url TEXT,
            role VARCHAR(16) NOT NULL CHECK (role IN ('doctor', 'patient')),
            timestamp TIMESTAMPTZ NOT NULL
        )
    ";
    client
        .execute(create_conversations_table_query, &[])
        .await
        .map_err(|e| format!("Error creating conversations table: {}", e))?;

    let create_order_index_query = "
        CREATE INDEX IF NOT EXISTS conversations_order_idx
        ON conversations (timestamp, seq)
    ";
    client
        .execute(create_order_index_query, &[])
        .await
        .map_err(|e| format!("Error creating conversations index: {}", e))?;

    Ok(())
}
