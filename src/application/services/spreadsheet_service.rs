use crate::domain::entities::{
    Client, ContactEventFilter, Holiday, ImportMode, ImportStats,
};
use crate::domain::ports::{ClientRepository, ContactEventRepository, HolidayRepository};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::utils::dates::{format_date, parse_spreadsheet_date};
use calamine::{Data, DataType, Reader};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

/// Canonical client columns and the header spellings accepted for each.
const CLIENT_COLUMNS: [(ClientColumn, &[&str]); 10] = [
    (
        ClientColumn::Name,
        &["NOME", "NOME_CLIENTE", "CLIENTE", "RAZAO_SOCIAL", "NAME"],
    ),
    (
        ClientColumn::Code,
        &["COD_CLIENTE", "CODIGO", "CODIGO_CLIENTE", "ID", "CODE"],
    ),
    (ClientColumn::City, &["MUNICIPIO", "CIDADE", "CITY"]),
    (ClientColumn::Branch, &["FILIAL", "BRANCH"]),
    (ClientColumn::Classification, &["CLASSE", "CLASSIFICATION"]),
    (
        ClientColumn::PartsPotential,
        &["POTENCIAL_PECAS", "POTENCIAL PECAS", "PECAS"],
    ),
    (
        ClientColumn::ServicePotential,
        &["POTENCIAL_SERVICO", "POTENCIAL SERVICO", "SERVICO"],
    ),
    (ClientColumn::Status6m, &["STATUS_6M", "STATUS 6M", "STATUS"]),
    (
        ClientColumn::PartsConsultant,
        &["CONSULTOR_PECAS", "CONSULTOR PECAS", "VENDEDOR_PECAS"],
    ),
    (
        ClientColumn::ServiceConsultant,
        &["CONSULTOR_SERVICOS", "CONSULTOR SERVICOS", "VENDEDOR_SERVICOS"],
    ),
];

const TEMPLATE_HEADERS: [&str; 10] = [
    "NOME",
    "COD_CLIENTE",
    "MUNICIPIO",
    "FILIAL",
    "CLASSE",
    "POTENCIAL_PECAS",
    "POTENCIAL_SERVICO",
    "STATUS_6M",
    "CONSULTOR_PECAS",
    "CONSULTOR_SERVICOS",
];

const TEMPLATE_EXAMPLE: [&str; 10] = [
    "EMPRESA EXEMPLO LTDA",
    "123456",
    "Sao Paulo",
    "SP",
    "AA",
    "15000.00",
    "8000.00",
    "ATIVO",
    "VENDEDOR EXEMPLO",
    "VENDEDOR EXEMPLO",
];

const CONTACT_EXPORT_HEADERS: [&str; 10] = [
    "DATA",
    "HORA",
    "COD_CLIENTE",
    "CLIENTE",
    "TIPO",
    "RESULTADO",
    "VENDEDOR",
    "PROXIMO_CONTATO",
    "OBSERVACOES",
    "ID",
];

const HOLIDAY_DATE_HEADERS: [&str; 2] = ["DATA", "DATE"];
const HOLIDAY_NAME_HEADERS: [&str; 2] = ["DESCRICAO", "NAME"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ClientColumn {
    Name,
    Code,
    City,
    Branch,
    Classification,
    PartsPotential,
    ServicePotential,
    Status6m,
    PartsConsultant,
    ServiceConsultant,
}

impl ClientColumn {
    fn label(&self) -> &'static str {
        match self {
            ClientColumn::Name => "NAME",
            ClientColumn::Code => "CODE",
            ClientColumn::City => "CITY",
            ClientColumn::Branch => "BRANCH",
            ClientColumn::Classification => "CLASSIFICATION",
            ClientColumn::PartsPotential => "PARTS_POTENTIAL",
            ClientColumn::ServicePotential => "SERVICE_POTENTIAL",
            ClientColumn::Status6m => "STATUS_6M",
            ClientColumn::PartsConsultant => "PARTS_CONSULTANT",
            ClientColumn::ServiceConsultant => "SERVICE_CONSULTANT",
        }
    }
}

fn normalize_header(header: &str) -> String {
    header.trim().trim_start_matches('\u{feff}').to_uppercase()
}

/// Maps each known column to the index of the first header matching one of its aliases.
fn map_client_headers(headers: &[String]) -> HashMap<ClientColumn, usize> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    CLIENT_COLUMNS
        .iter()
        .filter_map(|(column, aliases)| {
            normalized
                .iter()
                .position(|h| aliases.contains(&h.as_str()))
                .map(|idx| (*column, idx))
        })
        .collect()
}

fn find_header(headers: &[String], aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .map(|h| normalize_header(h))
        .position(|h| aliases.contains(&h.as_str()))
}

fn cell(record: &[String], idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| record.get(i))
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// Codes typed into spreadsheets often arrive as `123.0`.
fn parse_code(raw: &str) -> Option<i64> {
    raw.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.trunc() as i64)
}

fn parse_potential(raw: Option<&str>) -> f64 {
    raw.and_then(|v| v.replace(',', ".").parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// An uploaded sheet reduced to text cells. Rows keep their read error so
/// the import can report it against the right line.
struct Sheet {
    headers: Vec<String>,
    rows: Vec<Result<Vec<String>, String>>,
}

impl Sheet {
    /// Excel workbooks (`.xlsx`, `.xlsm`, `.xls`) are recognized by their
    /// container signature; anything else is read as comma separated text.
    fn parse(bytes: &[u8]) -> ApiResult<Self> {
        const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
        const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
            Self::from_workbook(bytes)
        } else {
            Self::from_csv(bytes)
        }
    }

    /// Reads the first worksheet.
    fn from_workbook(bytes: &[u8]) -> ApiResult<Self> {
        let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| ApiError::BadRequest(format!("Unreadable workbook: {}", e)))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ApiError::BadRequest("Workbook has no sheets".to_string()))?
            .map_err(|e| ApiError::BadRequest(format!("Unreadable worksheet: {}", e)))?;

        let mut rows = range
            .rows()
            .map(|row| row.iter().map(workbook_cell_text).collect::<Vec<_>>());
        let headers = rows.next().unwrap_or_default();

        Ok(Self {
            headers,
            rows: rows.map(Ok).collect(),
        })
    }

    fn from_csv(bytes: &[u8]) -> ApiResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);
        let headers = rdr.headers()?.iter().map(str::to_string).collect();
        let rows = rdr
            .records()
            .map(|record| {
                record
                    .map(|r| r.iter().map(str::to_string).collect())
                    .map_err(|e| e.to_string())
            })
            .collect();

        Ok(Self { headers, rows })
    }
}

/// Date cells render as `YYYY-MM-DD` so the text date parsers accept them.
fn workbook_cell_text(cell: &Data) -> String {
    match cell {
        Data::String(text) => text.clone(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(_) | Data::DateTimeIso(_) => {
            cell.as_date().map(format_date).unwrap_or_default()
        }
        _ => String::new(),
    }
}

fn finish(writer: csv::Writer<Vec<u8>>) -> ApiResult<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("Failed to write spreadsheet: {}", e)))
}

struct ClientRow {
    name: String,
    code: i64,
    city: Option<String>,
    branch: Option<String>,
    classification: Option<String>,
    parts_potential: f64,
    service_potential: f64,
    status_6m: Option<String>,
    parts_consultant: Option<String>,
    service_consultant: Option<String>,
}

impl ClientRow {
    fn apply(self, client: &mut Client) {
        client.name = self.name;
        client.city = self.city;
        client.branch = self.branch;
        client.classification = self.classification;
        client.parts_potential = self.parts_potential;
        client.service_potential = self.service_potential;
        client.status_6m = self.status_6m;
        client.parts_consultant = self.parts_consultant;
        client.service_consultant = self.service_consultant;
    }
}

#[derive(Clone)]
pub struct SpreadsheetService {
    client_repo: Arc<dyn ClientRepository>,
    contact_repo: Arc<dyn ContactEventRepository>,
    holiday_repo: Arc<dyn HolidayRepository>,
}

impl SpreadsheetService {
    pub fn new(
        client_repo: Arc<dyn ClientRepository>,
        contact_repo: Arc<dyn ContactEventRepository>,
        holiday_repo: Arc<dyn HolidayRepository>,
    ) -> Self {
        Self {
            client_repo,
            contact_repo,
            holiday_repo,
        }
    }

    /// Imports clients from an Excel workbook or a CSV body.
    ///
    /// Rows missing a name or code are ignored. In [`ImportMode::Add`] known
    /// codes are skipped; in [`ImportMode::Replace`] they are overwritten in place.
    pub async fn import_clients(&self, bytes: &[u8], mode: ImportMode) -> ApiResult<ImportStats> {
        let sheet = Sheet::parse(bytes)?;
        let columns = map_client_headers(&sheet.headers);

        let missing: Vec<&str> = [ClientColumn::Name, ClientColumn::Code]
            .iter()
            .filter(|c| !columns.contains_key(c))
            .map(|c| c.label())
            .collect();
        if !missing.is_empty() {
            return Err(ApiError::BadRequest(format!(
                "Required columns not found: {}",
                missing.join(", ")
            )));
        }

        let col = |c: ClientColumn| columns.get(&c).copied();
        let mut stats = ImportStats {
            mode,
            ..Default::default()
        };

        for (idx, record) in sheet.rows.iter().enumerate() {
            let line = idx + 2;
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    stats.errors.push(format!("Row {}: {}", line, e));
                    continue;
                }
            };

            let (Some(name), Some(raw_code)) = (
                cell(record, col(ClientColumn::Name)),
                cell(record, col(ClientColumn::Code)),
            ) else {
                continue;
            };

            let Some(code) = parse_code(raw_code) else {
                stats
                    .errors
                    .push(format!("Row {}: invalid client code '{}'", line, raw_code));
                continue;
            };

            let text = |c: ClientColumn| cell(record, col(c)).map(str::to_string);
            let row = ClientRow {
                name: name.to_string(),
                code,
                city: text(ClientColumn::City),
                branch: text(ClientColumn::Branch),
                classification: text(ClientColumn::Classification),
                parts_potential: parse_potential(cell(record, col(ClientColumn::PartsPotential))),
                service_potential: parse_potential(cell(
                    record,
                    col(ClientColumn::ServicePotential),
                )),
                status_6m: text(ClientColumn::Status6m),
                parts_consultant: text(ClientColumn::PartsConsultant),
                service_consultant: text(ClientColumn::ServiceConsultant),
            };

            if let Err(e) = self.store_client(row, mode, &mut stats).await {
                stats.errors.push(format!("Row {}: {}", line, e));
            }
        }

        stats.total = stats.imported + stats.updated;
        if mode == ImportMode::Replace {
            stats.skipped = 0;
        }

        tracing::info!(
            imported = stats.imported,
            updated = stats.updated,
            skipped = stats.skipped,
            errors = stats.errors.len(),
            "Client spreadsheet imported"
        );
        metrics::counter!("oxicrm_spreadsheet_imports_total", "kind" => "clients").increment(1);

        Ok(stats)
    }

    async fn store_client(
        &self,
        row: ClientRow,
        mode: ImportMode,
        stats: &mut ImportStats,
    ) -> ApiResult<()> {
        match self.client_repo.get_client_by_code(row.code).await? {
            Some(_) if mode == ImportMode::Add => {
                stats.skipped += 1;
            }
            Some(mut existing) => {
                row.apply(&mut existing);
                existing.updated_at = chrono::Utc::now().to_rfc3339();
                self.client_repo.update_client(&existing).await?;
                stats.updated += 1;
            }
            None => {
                let mut client = Client::new(row.name.clone(), row.code);
                row.apply(&mut client);
                self.client_repo.create_client(&client).await?;
                stats.imported += 1;
            }
        }
        Ok(())
    }

    /// Header row plus one example row.
    pub fn client_template(&self) -> ApiResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(TEMPLATE_HEADERS)?;
        writer.write_record(TEMPLATE_EXAMPLE)?;
        finish(writer)
    }

    /// Every client, in the same layout the importer reads.
    pub async fn export_clients(&self) -> ApiResult<Vec<u8>> {
        let clients = self.client_repo.list_all_clients().await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(TEMPLATE_HEADERS)?;
        for client in clients {
            writer.write_record([
                client.name,
                client.code.to_string(),
                client.city.unwrap_or_default(),
                client.branch.unwrap_or_default(),
                client.classification.unwrap_or_default(),
                format!("{:.2}", client.parts_potential),
                format!("{:.2}", client.service_potential),
                client.status_6m.unwrap_or_default(),
                client.parts_consultant.unwrap_or_default(),
                client.service_consultant.unwrap_or_default(),
            ])?;
        }
        finish(writer)
    }

    pub async fn export_contacts(&self, filter: &ContactEventFilter) -> ApiResult<Vec<u8>> {
        let total = self.contact_repo.count_contact_events(filter).await?;
        let events = self.contact_repo.list_contact_events(filter, total, 0).await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CONTACT_EXPORT_HEADERS)?;
        for view in events {
            let event = view.event;
            writer.write_record([
                event.contact_date,
                event.contact_time,
                view.client_code.map(|c| c.to_string()).unwrap_or_default(),
                view.client_name.unwrap_or_default(),
                event.contact_type,
                event.contact_result,
                event.seller,
                event.next_contact_date.unwrap_or_default(),
                event.notes.unwrap_or_default(),
                event.id,
            ])?;
        }
        finish(writer)
    }

    /// Imports non-recurring holidays from a workbook or CSV; dates already
    /// on file are skipped.
    pub async fn import_holidays(&self, bytes: &[u8]) -> ApiResult<ImportStats> {
        let sheet = Sheet::parse(bytes)?;

        let date_idx = find_header(&sheet.headers, &HOLIDAY_DATE_HEADERS)
            .ok_or_else(|| ApiError::BadRequest("Required columns not found: DATE".to_string()))?;
        let name_idx = find_header(&sheet.headers, &HOLIDAY_NAME_HEADERS);

        let mut stats = ImportStats::default();
        for (idx, record) in sheet.rows.iter().enumerate() {
            let line = idx + 2;
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    stats.errors.push(format!("Row {}: {}", line, e));
                    continue;
                }
            };

            let Some(raw_date) = cell(record, Some(date_idx)) else {
                continue;
            };
            let Some(date) = parse_spreadsheet_date(raw_date) else {
                stats
                    .errors
                    .push(format!("Row {}: invalid date '{}'", line, raw_date));
                continue;
            };

            let iso = format_date(date);
            if self.holiday_repo.get_holiday_by_date(&iso).await?.is_some() {
                stats.skipped += 1;
                continue;
            }

            let name = cell(record, name_idx)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Holiday {}", date.format("%d/%m/%Y")));
            let holiday = Holiday::new(name, iso, false);
            match self.holiday_repo.create_holiday(&holiday).await {
                Ok(()) => stats.imported += 1,
                Err(e) => stats.errors.push(format!("Row {}: {}", line, e)),
            }
        }
        stats.total = stats.imported;

        tracing::info!(
            imported = stats.imported,
            skipped = stats.skipped,
            "Holiday spreadsheet imported"
        );
        metrics::counter!("oxicrm_spreadsheet_imports_total", "kind" => "holidays").increment(1);

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(row: &[&str]) -> Vec<String> {
        row.iter().map(|h| h.to_string()).collect()
    }

    #[test]
    fn test_header_aliases_are_case_insensitive() {
        let columns = map_client_headers(&headers(&[
            "razao_social",
            " Codigo ",
            "Cidade",
            "POTENCIAL PECAS",
            "vendedor_servicos",
        ]));

        assert_eq!(columns.get(&ClientColumn::Name), Some(&0));
        assert_eq!(columns.get(&ClientColumn::Code), Some(&1));
        assert_eq!(columns.get(&ClientColumn::City), Some(&2));
        assert_eq!(columns.get(&ClientColumn::PartsPotential), Some(&3));
        assert_eq!(columns.get(&ClientColumn::ServiceConsultant), Some(&4));
        assert!(!columns.contains_key(&ClientColumn::Branch));
    }

    #[test]
    fn test_first_matching_header_wins() {
        let columns = map_client_headers(&headers(&["ID", "COD_CLIENTE", "NOME"]));
        assert_eq!(columns.get(&ClientColumn::Code), Some(&0));
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let columns = map_client_headers(&headers(&["\u{feff}NOME", "CODE"]));
        assert_eq!(columns.get(&ClientColumn::Name), Some(&0));
    }

    #[test]
    fn test_sheet_format_is_sniffed() {
        let sheet = Sheet::parse(b"NOME,CODE\nAlpha,1\n").unwrap();
        assert_eq!(sheet.headers, headers(&["NOME", "CODE"]));
        assert_eq!(sheet.rows.len(), 1);

        // zip signature without a valid workbook inside
        let err = Sheet::parse(b"PK\x03\x04garbage").err().unwrap();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_workbook_cells_render_as_text() {
        assert_eq!(workbook_cell_text(&Data::Float(123.0)), "123");
        assert_eq!(workbook_cell_text(&Data::Float(1500.5)), "1500.5");
        assert_eq!(workbook_cell_text(&Data::String("AA".to_string())), "AA");
        assert_eq!(workbook_cell_text(&Data::Empty), "");
    }

    #[test]
    fn test_parse_code_truncates_floats() {
        assert_eq!(parse_code("123"), Some(123));
        assert_eq!(parse_code("123.0"), Some(123));
        assert_eq!(parse_code("123.9"), Some(123));
        assert_eq!(parse_code("abc"), None);
    }

    #[test]
    fn test_unparsable_potential_is_zero() {
        assert_eq!(parse_potential(Some("1500.5")), 1500.5);
        assert_eq!(parse_potential(Some("1500,5")), 1500.5);
        assert_eq!(parse_potential(Some("n/a")), 0.0);
        assert_eq!(parse_potential(None), 0.0);
    }
}
