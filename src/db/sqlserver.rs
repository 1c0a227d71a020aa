// ABOUTME: SQL Server query runner using tiberius
// ABOUTME: Opens a fresh connection per statement and converts rows to plain values

use tiberius::{AuthMethod, Client, ColumnData, Config, ToSql};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use super::runner::{Dialect, QueryError, QueryRunner, Row, Statement, Value};
use crate::config::ConnectionProfile;

impl From<tiberius::error::Error> for QueryError {
    fn from(e: tiberius::error::Error) -> Self {
        match e {
            tiberius::error::Error::Io { .. } | tiberius::error::Error::Tls(_) => {
                QueryError::Connection(e.to_string())
            }
            other => QueryError::Execution(other.to_string()),
        }
    }
}

pub struct SqlServerRunner {
    profile: ConnectionProfile,
}

impl SqlServerRunner {
    pub fn new(profile: ConnectionProfile) -> Self {
        Self { profile }
    }

    /// Connect to SQL Server using the stored profile
    async fn connect(&self) -> Result<Client<Compat<TcpStream>>, QueryError> {
        let mut config = Config::new();
        config.host(&self.profile.host);
        config.port(self.profile.port);
        config.authentication(AuthMethod::sql_server(
            &self.profile.username,
            &self.profile.password,
        ));

        if !self.profile.database.is_empty() {
            config.database(&self.profile.database);
        }

        if self.profile.trust_certificate {
            config.trust_cert();
        }

        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| QueryError::Connection(e.to_string()))?;

        tcp.set_nodelay(true)
            .map_err(|e| QueryError::Connection(e.to_string()))?;

        Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| QueryError::Connection(e.to_string()))
    }
}

impl QueryRunner for SqlServerRunner {
    fn dialect(&self) -> Dialect {
        Dialect::SqlServer
    }

    async fn run(&self, statement: &Statement) -> Result<Vec<Row>, QueryError> {
        log::debug!("Connecting to {}:{}", self.profile.host, self.profile.port);
        let mut client = self.connect().await?;

        let params: Vec<&dyn ToSql> = statement.params.iter().map(|p| p as &dyn ToSql).collect();
        let rows = client
            .query(statement.sql.as_str(), &params)
            .await?
            .into_first_result()
            .await?;

        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(column_value).collect())
            .collect();

        // Dropping the client closes the connection; a failed close is not an error here
        let _ = client.close().await;
        Ok(rows)
    }
}

fn column_value(data: ColumnData<'static>) -> Value {
    match data {
        ColumnData::U8(v) => v.map(|v| Value::Int(v.into())).unwrap_or(Value::Null),
        ColumnData::I16(v) => v.map(|v| Value::Int(v.into())).unwrap_or(Value::Null),
        ColumnData::I32(v) => v.map(|v| Value::Int(v.into())).unwrap_or(Value::Null),
        ColumnData::I64(v) => v.map(Value::Int).unwrap_or(Value::Null),
        ColumnData::F32(v) => v.map(|v| Value::Float(v.into())).unwrap_or(Value::Null),
        ColumnData::F64(v) => v.map(Value::Float).unwrap_or(Value::Null),
        ColumnData::Bit(v) => v.map(Value::Bool).unwrap_or(Value::Null),
        ColumnData::String(v) => v
            .map(|s| Value::Text(s.into_owned()))
            .unwrap_or(Value::Null),
        ColumnData::Guid(v) => v.map(|g| Value::Text(g.to_string())).unwrap_or(Value::Null),
        ColumnData::Numeric(v) => v.map(|n| Value::Text(n.to_string())).unwrap_or(Value::Null),
        other => Value::Text(format!("{:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn test_column_value_conversion() {
        assert_eq!(column_value(ColumnData::I32(Some(5))), Value::Int(5));
        assert_eq!(column_value(ColumnData::I32(None)), Value::Null);
        assert_eq!(column_value(ColumnData::Bit(Some(true))), Value::Bool(true));
        assert_eq!(
            column_value(ColumnData::String(Some(Cow::Borrowed("NORTH")))),
            Value::Text("NORTH".to_string())
        );
        assert_eq!(column_value(ColumnData::String(None)), Value::Null);
    }

    #[test]
    fn test_runner_speaks_sql_server() {
        let runner = SqlServerRunner::new(ConnectionProfile::default());
        assert_eq!(runner.dialect(), Dialect::SqlServer);
    }
}
