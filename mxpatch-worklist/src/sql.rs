//! SQL Server work list.
//!
//! Runs one query against the source environment's database on a
//! current-thread runtime and waits for the full result. Column 0 is the
//! resource name; column 1, when present, is kept as the item's unique id.

use mxpatch_core::{ConnectionCoordinates, WorkItem};
use tiberius::{AuthMethod, Client, Config, Row};
use tokio::net::TcpStream;
use tokio_util::compat::TokioAsyncWriteCompatExt;

use crate::{WorkListError, WorkListProvider};

/// Lists resources by querying a live database.
#[derive(Debug, Clone)]
pub struct SqlWorkList {
    coordinates: ConnectionCoordinates,
    query: String,
}

impl SqlWorkList {
    pub fn new(coordinates: ConnectionCoordinates, query: impl Into<String>) -> Self {
        Self {
            coordinates,
            query: query.into(),
        }
    }

    fn source_name(&self) -> String {
        let c = &self.coordinates;
        format!("{}:{}/{}", c.host, c.port, c.database)
    }

    fn unavailable(&self, reason: impl ToString) -> WorkListError {
        WorkListError::SourceUnavailable {
            source_name: self.source_name(),
            reason: reason.to_string(),
        }
    }

    fn tds_config(&self) -> Result<Config, WorkListError> {
        let c = &self.coordinates;
        let user = c
            .user
            .as_deref()
            .ok_or_else(|| self.unavailable("no database user in properties"))?;

        let mut config = Config::new();
        config.host(&c.host);
        config.port(c.port);
        config.database(&c.database);
        config.authentication(AuthMethod::sql_server(
            user,
            c.password.as_deref().unwrap_or_default(),
        ));
        config.trust_cert();
        Ok(config)
    }
}

impl WorkListProvider for SqlWorkList {
    fn list_resources(&self) -> Result<Vec<WorkItem>, WorkListError> {
        let config = self.tds_config()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| self.unavailable(e))?;

        tracing::debug!(source = %self.source_name(), query = %self.query, "querying work list");
        let rows = runtime
            .block_on(fetch_rows(config, &self.query))
            .map_err(|e| self.unavailable(e))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let Some(name) = column_text(row, 0) else {
                tracing::warn!("skipping work-list row without a name");
                continue;
            };
            let mut item = WorkItem::named(name);
            item.unique_id = column_text(row, 1);
            items.push(item);
        }
        tracing::info!(source = %self.source_name(), items = items.len(), "work list loaded");
        Ok(items)
    }
}

async fn fetch_rows(config: Config, query: &str) -> tiberius::Result<Vec<Row>> {
    let tcp = TcpStream::connect(config.get_addr()).await?;
    tcp.set_nodelay(true)?;
    let mut client = Client::connect(config, tcp.compat_write()).await?;
    let rows = client.simple_query(query).await?.into_first_result().await?;
    client.close().await?;
    Ok(rows)
}

/// Text of column `idx`, accepting string and integer columns.
fn column_text(row: &Row, idx: usize) -> Option<String> {
    if idx >= row.len() {
        return None;
    }
    if let Ok(Some(s)) = row.try_get::<&str, _>(idx) {
        let s = s.trim();
        return (!s.is_empty()).then(|| s.to_string());
    }
    if let Ok(Some(n)) = row.try_get::<i64, _>(idx) {
        return Some(n.to_string());
    }
    if let Ok(Some(n)) = row.try_get::<i32, _>(idx) {
        return Some(n.to_string());
    }
    None
}
