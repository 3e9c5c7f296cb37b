use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::SheetsError;
use super::{Row, RowStore};
use crate::config::SheetsConfig;
use crate::http;

/// Body shared by value reads and writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

pub struct SheetsClient {
    access_token: String,
    base_url: String,
    spreadsheet_id: String,
    client: Client,
}

impl SheetsClient {
    pub fn new(config: &SheetsConfig) -> Result<Self, SheetsError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            access_token: config.access_token.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            client,
        })
    }

    /// `{base}/spreadsheets/{id}/values/{range}`, with `range` percent-encoded as one segment.
    fn values_url(&self, range: &str) -> Result<Url, SheetsError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| SheetsError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["spreadsheets", self.spreadsheet_id.as_str(), "values", range]);
        Ok(url)
    }

    async fn values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.values_url(range)?;
        let body: ValueRange = self.send(self.client.get(url)).await?;
        Ok(body.values)
    }

    async fn header(&self, table: &str) -> Result<Vec<String>, SheetsError> {
        let mut rows = self.values(&format!("{table}!1:1")).await?;
        Ok(if rows.is_empty() { Vec::new() } else { rows.swap_remove(0) })
    }

    async fn send<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R, SheetsError> {
        Ok(http::send_json(request.bearer_auth(&self.access_token)).await?)
    }
}

impl RowStore for SheetsClient {
    async fn read_all(&self, table: &str) -> Result<Vec<Row>, SheetsError> {
        let mut values = self.values(table).await?.into_iter();
        let Some(header) = values.next() else {
            return Ok(Vec::new());
        };
        let rows: Vec<Row> = values.map(|cells| Row::from_cells(&header, &cells)).collect();
        tracing::debug!(table, rows = rows.len(), "Read table");
        Ok(rows)
    }

    async fn append_row(&self, table: &str, cells: &[String]) -> Result<(), SheetsError> {
        let url = self.values_url(&format!("{table}:append"))?;
        let body = ValueRange {
            values: vec![cells.to_vec()],
        };
        let _: serde_json::Value = self
            .send(
                self.client
                    .post(url)
                    .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
                    .json(&body),
            )
            .await?;
        tracing::info!(table, "Appended row");
        Ok(())
    }

    async fn update_cell(
        &self,
        table: &str,
        row_index: usize,
        column: &str,
        value: &str,
    ) -> Result<(), SheetsError> {
        let header = self.header(table).await?;
        let position = header
            .iter()
            .position(|name| name == column)
            .ok_or_else(|| SheetsError::MissingColumn {
                table: table.to_string(),
                column: column.to_string(),
            })?;
        // +1 for one-based rows, +1 to skip the header.
        let cell = format!("{table}!{}{}", column_letter(position), row_index + 2);
        let url = self.values_url(&cell)?;
        let body = ValueRange {
            values: vec![vec![value.to_string()]],
        };
        let _: serde_json::Value = self
            .send(
                self.client
                    .put(url)
                    .query(&[("valueInputOption", "RAW")])
                    .json(&body),
            )
            .await?;
        tracing::info!(table, cell = %cell, "Updated cell");
        Ok(())
    }
}

/// Zero-based column index to A1 letters: 0 -> A, 25 -> Z, 26 -> AA.
fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> SheetsClient {
        SheetsClient::new(&SheetsConfig {
            access_token: "ya29.test".into(),
            base_url: server.uri(),
            spreadsheet_id: "sheet-1".into(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(3), "D");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[tokio::test]
    async fn read_all_maps_rows_by_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spreadsheets/sheet-1/values/Episodios"))
            .and(header("authorization", "Bearer ya29.test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "range": "Episodios!A1:Z1000",
                "majorDimension": "ROWS",
                "values": [
                    ["Episódio", "Descrição Curta", "Moral", "Status"],
                    ["A Arca de Noé", "Noé constrói a arca", "Obediência", "Approved"],
                    ["Davi e Golias"]
                ]
            })))
            .mount(&server)
            .await;

        let rows = client_for(&server).read_all("Episodios").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Moral"), "Obediência");
        assert_eq!(rows[1].get("Episódio"), "Davi e Golias");
        assert_eq!(rows[1].get("Status"), "");
    }

    #[tokio::test]
    async fn read_all_of_empty_sheet_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spreadsheets/sheet-1/values/Personagens"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "range": "Personagens!A1:Z1000",
                "majorDimension": "ROWS"
            })))
            .mount(&server)
            .await;

        let rows = client_for(&server).read_all("Personagens").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn append_row_posts_raw_values() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/spreadsheets/sheet-1/values/Episodios:append"))
            .and(query_param("valueInputOption", "RAW"))
            .and(body_json(serde_json::json!({
                "values": [["Jonas", "Jonas e o grande peixe", "Obediência", "Aguardando Aprovação"]]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"updates": {}})))
            .expect(1)
            .mount(&server)
            .await;

        let cells = ["Jonas", "Jonas e o grande peixe", "Obediência", "Aguardando Aprovação"]
            .map(String::from);
        client_for(&server).append_row("Episodios", &cells).await.unwrap();
    }

    #[tokio::test]
    async fn update_cell_resolves_column_and_skips_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spreadsheets/sheet-1/values/Episodios!1:1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "values": [["Episódio", "Descrição Curta", "Moral", "Status"]]
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/spreadsheets/sheet-1/values/Episodios!D2"))
            .and(body_json(serde_json::json!({"values": [["Approved"]]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"updatedCells": 1})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .update_cell("Episodios", 0, "Status", "Approved")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_cell_with_unknown_column_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spreadsheets/sheet-1/values/Personagens!1:1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "values": [["Nome", "Papel"]]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .update_cell("Personagens", 0, "Link Imagem", "https://x")
            .await
            .unwrap_err();
        assert!(matches!(err, SheetsError::MissingColumn { ref column, .. } if column == "Link Imagem"));
    }

    #[tokio::test]
    async fn api_error_surfaces_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spreadsheets/sheet-1/values/Cenas"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Unable to parse range: Cenas"))
            .mount(&server)
            .await;

        let err = client_for(&server).read_all("Cenas").await.unwrap_err();
        assert_eq!(err.to_string(), "API error (status 400): Unable to parse range: Cenas");
    }
}
