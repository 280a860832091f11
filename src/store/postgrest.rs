//! Blocking PostgREST client. One instance per credential (anon or
//! service-role); both are plain HTTP with a different bearer key.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde_json::Value;

use super::{Filter, Order, Row, StoreError, TableStore};

pub struct PostgrestClient {
    http: Client,
    base: String,
    key: String,
    label: String,
}

impl PostgrestClient {
    /// `url` is the project root (no trailing `/rest/v1`).
    pub fn new(url: &str, key: &str, label: &str) -> Result<Self, StoreError> {
        let http = Client::builder()
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base: format!("{}/rest/v1", url.trim_end_matches('/')),
            key: key.to_string(),
            label: label.to_string(),
        })
    }

    fn request(&self, method: reqwest::Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.base, table))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
        filters
            .iter()
            .map(|f| {
                let raw = match &f.value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (f.column.clone(), format!("eq.{raw}"))
            })
            .collect()
    }

    fn read_rows(&self, table: &str, resp: Response) -> Result<Vec<Value>, StoreError> {
        let resp = self.check(table, resp)?;
        let body: Value = resp
            .json()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        match body {
            Value::Array(rows) => Ok(rows),
            other => Ok(vec![other]),
        }
    }

    /// Maps PostgREST error bodies onto the structured taxonomy. Drift
    /// detection keys on the SQLSTATE / PGRST code carried in the body, not
    /// on message substrings.
    fn check(&self, table: &str, resp: Response) -> Result<Response, StoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().unwrap_or_default();
        let parsed: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        let code = parsed.get("code").and_then(Value::as_str).unwrap_or("");
        let message = parsed
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.clone());

        let err = match code {
            // undefined_column (SQLSTATE) or a schema-cache miss (PostgREST)
            "42703" | "PGRST204" => StoreError::MissingColumn {
                table: table.to_string(),
                column: column_from_message(&message).unwrap_or_default(),
            },
            "42P01" => StoreError::MissingTable {
                table: table.to_string(),
            },
            "23505" => StoreError::Conflict(message),
            "PGRST116" => StoreError::NotFound,
            _ if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN => {
                StoreError::Permission(message)
            }
            _ => StoreError::Remote(message),
        };
        Err(err)
    }
}

/// Pulls the offending column name out of a Postgres/PostgREST message.
/// Postgres says `column "suffix" of relation "students" does not exist`;
/// PostgREST's schema cache says `Could not find the 'suffix' column ...`.
fn column_from_message(message: &str) -> Option<String> {
    for quote in ['"', '\''] {
        if let Some(start) = message.find(quote) {
            let rest = &message[start + 1..];
            if let Some(end) = rest.find(quote) {
                let name = &rest[..end];
                if !name.is_empty() && !name.contains(' ') {
                    return Some(name.to_string());
                }
            }
        }
    }
    None
}

impl TableStore for PostgrestClient {
    fn select(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> Result<Vec<Value>, StoreError> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(Self::filter_params(filters));
        if let Some(o) = order {
            let dir = if o.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{dir}", o.column)));
        }
        let resp = self
            .request(reqwest::Method::GET, table)
            .query(&params)
            .send()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        self.read_rows(table, resp)
    }

    fn select_one(&self, table: &str, filters: &[Filter]) -> Result<Option<Value>, StoreError> {
        let mut params = vec![
            ("select".to_string(), "*".to_string()),
            ("limit".to_string(), "1".to_string()),
        ];
        params.extend(Self::filter_params(filters));
        let resp = self
            .request(reqwest::Method::GET, table)
            .query(&params)
            .send()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(self.read_rows(table, resp)?.into_iter().next())
    }

    fn insert(&self, table: &str, row: &Row) -> Result<Value, StoreError> {
        let resp = self
            .request(reqwest::Method::POST, table)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        self.read_rows(table, resp)?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound)
    }

    fn update(&self, table: &str, filters: &[Filter], patch: &Row) -> Result<Value, StoreError> {
        let resp = self
            .request(reqwest::Method::PATCH, table)
            .query(&Self::filter_params(filters))
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        self.read_rows(table, resp)?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound)
    }

    fn upsert(
        &self,
        table: &str,
        rows: &[Row],
        on_conflict: &[&str],
    ) -> Result<Vec<Value>, StoreError> {
        let resp = self
            .request(reqwest::Method::POST, table)
            .query(&[("on_conflict", on_conflict.join(","))])
            .header("Prefer", "return=representation,resolution=merge-duplicates")
            .json(rows)
            .send()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        self.read_rows(table, resp)
    }

    fn delete(&self, table: &str, filters: &[Filter]) -> Result<u64, StoreError> {
        let resp = self
            .request(reqwest::Method::DELETE, table)
            .query(&Self::filter_params(filters))
            .header("Prefer", "return=representation")
            .send()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(self.read_rows(table, resp)?.len() as u64)
    }

    fn search(
        &self,
        table: &str,
        columns: &[&str],
        needle: &str,
        order: Option<&Order>,
    ) -> Result<Vec<Value>, StoreError> {
        let disjunction = columns
            .iter()
            .map(|c| format!("{c}.ilike.*{needle}*"))
            .collect::<Vec<_>>()
            .join(",");
        let mut params = vec![
            ("select".to_string(), "*".to_string()),
            ("or".to_string(), format!("({disjunction})")),
        ];
        if let Some(o) = order {
            let dir = if o.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{dir}", o.column)));
        }
        let resp = self
            .request(reqwest::Method::GET, table)
            .query(&params)
            .send()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        self.read_rows(table, resp)
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::column_from_message;

    #[test]
    fn parses_postgres_undefined_column() {
        let msg = r#"column "suffix" of relation "students" does not exist"#;
        assert_eq!(column_from_message(msg).as_deref(), Some("suffix"));
    }

    #[test]
    fn parses_schema_cache_miss() {
        let msg = "Could not find the 'staff_id' column of 'section_subjects' in the schema cache";
        assert_eq!(column_from_message(msg).as_deref(), Some("staff_id"));
    }

    #[test]
    fn unparseable_message_yields_none() {
        assert_eq!(column_from_message("permission denied"), None);
    }
}
