//! IMPORTADO catalog: the Tango article tables on SQL Server.
//!
//! Lookups load the full result set and scan it linearly. Nothing is
//! cached: every search re-runs the query.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tiberius::{AuthMethod, Client, Config, EncryptionLevel, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{error, info};

use crate::error::CatalogError;
use crate::model::{CatalogPiece, ImportadoRecord, PieceSource};

/// Characters of the scanned code that hold the piece number.
const PIECE_NUMBER_WIDTH: usize = 15;
/// Trailing characters of the scanned code that hold the weight.
const WEIGHT_WIDTH: usize = 5;

const CATALOG_QUERY: &str = "
SELECT  articulos.COD_ARTICU as NumeroPieza,
        articulos.DESCRIPCIO as ColorArticulo,
        articulos.DESC_ADIC as ColorPorArticulo,
        articulos.BASE as NumeroArticulo,
        articulos2.DESCRIPCIO as NombreArticulo,
        CAST(precios.PRECIO AS FLOAT) as PrecioArticulo,
        carpetas.DESCRIP as TipoArticulo
FROM STA11 articulos
JOIN STA11ITC articulosxcarpeta
    ON articulos.COD_ARTICU = articulosxcarpeta.CODE
JOIN STA11FLD carpetas
    ON carpetas.IDFOLDER = articulosxcarpeta.IDFOLDER
JOIN STA11 articulos2
    ON articulos.BASE = articulos2.COD_ARTICU
JOIN GVA17 precios
    ON articulos.ID_STA11 = precios.ID_STA11
JOIN GVA10 listasdeprecio
    ON precios.ID_GVA10 = listasdeprecio.ID_GVA10
WHERE   (listasdeprecio.NRO_DE_LIS = 1 OR listasdeprecio.NRO_DE_LIS = 10)
        AND (carpetas.DESCRIP = 'IMPORTADO' OR carpetas.DESCRIP = 'AVIOS' OR carpetas.DESCRIP = 'OFERTAS')
        AND articulos.PERFIL = 'A'
ORDER BY articulos.COD_ARTICU
";

/// Anything that can produce the full IMPORTADO result set.
#[async_trait]
pub trait ImportadoSource: Send + Sync {
    async fn load_all(&self) -> Result<Vec<ImportadoRecord>, CatalogError>;
}

/// SQL Server connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportadoConfig {
    pub host: String,
    /// Named instance, resolved through the SQL Browser service.
    pub instance: Option<String>,
    /// Fixed TCP port. Ignored when `instance` is set.
    pub port: Option<u16>,
    pub database: String,
    pub username: String,
    pub password: String,
    pub trust_cert: bool,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for ImportadoConfig {
    fn default() -> Self {
        Self {
            host: "TANGO".to_string(),
            instance: Some("AXSQLEXPRESS".to_string()),
            port: None,
            database: "LA_NUEVA_TEXTIL".to_string(),
            username: "Axoft".to_string(),
            password: "Axoft".to_string(),
            trust_cert: true,
            connect_timeout_secs: 30,
            request_timeout_secs: 30,
        }
    }
}

/// Live IMPORTADO source. Opens one connection per load and closes it.
pub struct MssqlSource {
    config: ImportadoConfig,
}

impl MssqlSource {
    pub fn new(config: ImportadoConfig) -> Self {
        Self { config }
    }

    fn tiberius_config(&self) -> Config {
        let mut config = Config::new();
        config.host(&self.config.host);
        if let Some(port) = self.config.port {
            config.port(port);
        }
        if let Some(instance) = &self.config.instance {
            config.instance_name(instance);
        }
        config.database(&self.config.database);
        config.authentication(AuthMethod::sql_server(
            &self.config.username,
            &self.config.password,
        ));
        if self.config.trust_cert {
            config.trust_cert();
        }
        config.encryption(EncryptionLevel::NotSupported);
        config
    }

    async fn connect(&self) -> Result<Client<Compat<TcpStream>>, CatalogError> {
        let config = self.tiberius_config();

        let tcp = if self.config.instance.is_some() {
            TcpStream::connect_named(&config).await?
        } else {
            TcpStream::connect(config.get_addr())
                .await
                .map_err(|e| CatalogError::Database(e.to_string()))?
        };
        tcp.set_nodelay(true)
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(Client::connect(config, tcp.compat_write()).await?)
    }

    async fn run_query(
        client: &mut Client<Compat<TcpStream>>,
    ) -> Result<Vec<ImportadoRecord>, CatalogError> {
        let rows = client
            .simple_query(CATALOG_QUERY)
            .await?
            .into_first_result()
            .await?;

        rows.iter().map(record_from_row).collect()
    }
}

#[async_trait]
impl ImportadoSource for MssqlSource {
    async fn load_all(&self) -> Result<Vec<ImportadoRecord>, CatalogError> {
        info!("Loading IMPORTADO data from database...");

        let connect_timeout = Duration::from_secs(self.config.connect_timeout_secs);
        let mut client = tokio::time::timeout(connect_timeout, self.connect())
            .await
            .map_err(|_| CatalogError::Timeout("IMPORTADO connection"))??;

        let request_timeout = Duration::from_secs(self.config.request_timeout_secs);
        let result = tokio::time::timeout(request_timeout, Self::run_query(&mut client))
            .await
            .map_err(|_| CatalogError::Timeout("IMPORTADO query"));

        if let Err(e) = client.close().await {
            error!("Error closing DB connection: {e}");
        }

        let records = result??;
        info!("Loaded {} IMPORTADO pieces", records.len());
        Ok(records)
    }
}

fn text(row: &tiberius::Row, col: &str) -> Result<Option<String>, CatalogError> {
    Ok(row.try_get::<&str, _>(col)?.map(str::to_string))
}

fn record_from_row(row: &tiberius::Row) -> Result<ImportadoRecord, CatalogError> {
    Ok(ImportadoRecord {
        numero_pieza: text(row, "NumeroPieza")?.unwrap_or_default(),
        color_articulo: text(row, "ColorArticulo")?,
        color_por_articulo: text(row, "ColorPorArticulo")?,
        numero_articulo: text(row, "NumeroArticulo")?,
        nombre_articulo: text(row, "NombreArticulo")?,
        precio_articulo: row.try_get::<f64, _>("PrecioArticulo")?,
        tipo_articulo: text(row, "TipoArticulo")?,
    })
}

// ── Scanned code handling ───────────────────────────────────────────

/// A scanned IMPORTADO label code, e.g. `"54999000       022.40"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedCode {
    /// The code exactly as scanned.
    pub full: String,
    /// First 15 characters, trimmed.
    pub piece_number: String,
    /// Last 5 characters (the whole code if shorter), trimmed.
    pub weight: String,
}

impl ScannedCode {
    pub fn parse(code: &str) -> Self {
        let chars: Vec<char> = code.chars().collect();
        let piece_number: String = chars.iter().take(PIECE_NUMBER_WIDTH).collect();
        let weight_start = chars.len().saturating_sub(WEIGHT_WIDTH);
        let weight: String = chars[weight_start..].iter().collect();

        Self {
            full: code.to_string(),
            piece_number: piece_number.trim().to_string(),
            weight: weight.trim().to_string(),
        }
    }
}

/// First record whose piece number matches exactly.
pub fn find_record<'a>(
    records: &'a [ImportadoRecord],
    piece_number: &str,
) -> Option<&'a ImportadoRecord> {
    records.iter().find(|r| r.numero_pieza == piece_number)
}

/// Build the display record for a matched IMPORTADO row.
pub fn to_catalog_piece(
    record: &ImportadoRecord,
    code: &ScannedCode,
) -> Result<CatalogPiece, CatalogError> {
    let mut original = serde_json::to_value(record)
        .map_err(|e| CatalogError::Decode(e.to_string()))?;
    if let Some(obj) = original.as_object_mut() {
        obj.insert("peso".into(), code.weight.clone().into());
        obj.insert("codigoCompleto".into(), code.full.clone().into());
    }

    Ok(CatalogPiece {
        id: code.full.clone(),
        article: format!(
            "Artículo: {}",
            record.nombre_articulo.as_deref().unwrap_or_default()
        ),
        cod_articulo: None,
        color: format!(
            "Color: {}",
            record.color_por_articulo.as_deref().unwrap_or_default()
        ),
        measure: format!("Medida: {} kg", code.weight),
        id_color_web: None,
        original_data: Some(original),
        source: PieceSource::Importado,
    })
}

/// In-memory source, for tests and offline runs.
pub struct StaticSource {
    records: Vec<ImportadoRecord>,
}

impl StaticSource {
    pub fn new(records: Vec<ImportadoRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl ImportadoSource for StaticSource {
    async fn load_all(&self) -> Result<Vec<ImportadoRecord>, CatalogError> {
        Ok(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(number: &str, name: &str, color: &str) -> ImportadoRecord {
        ImportadoRecord {
            numero_pieza: number.into(),
            nombre_articulo: Some(name.into()),
            color_por_articulo: Some(color.into()),
            ..Default::default()
        }
    }

    #[test]
    fn parse_fixed_width_code() {
        let code = ScannedCode::parse("54999000       022.40");
        assert_eq!(code.piece_number, "54999000");
        assert_eq!(code.weight, "22.40");
        assert_eq!(code.full, "54999000       022.40");
    }

    #[test]
    fn parse_short_code_uses_whole_string_for_weight() {
        let code = ScannedCode::parse("123");
        assert_eq!(code.piece_number, "123");
        assert_eq!(code.weight, "123");
    }

    #[test]
    fn parse_counts_characters_not_bytes() {
        let code = ScannedCode::parse("ÑANDÚ0000000000 12.5");
        assert_eq!(code.piece_number, "ÑANDÚ0000000000");
        assert_eq!(code.weight, "12.5");
    }

    #[test]
    fn find_record_matches_exactly() {
        let records = vec![
            record("549990", "Short", "A"),
            record("54999000", "Lycra", "Negro"),
            record("54999000", "Duplicate", "Blanco"),
        ];
        assert_eq!(
            find_record(&records, "54999000").unwrap().nombre_articulo.as_deref(),
            Some("Lycra")
        );
        assert!(find_record(&records, "5499900").is_none());
    }

    #[test]
    fn catalog_piece_carries_code_and_weight() {
        let rec = record("54999000", "Lycra", "Negro");
        let code = ScannedCode::parse("54999000       022.40");
        let piece = to_catalog_piece(&rec, &code).unwrap();

        assert_eq!(piece.id, "54999000       022.40");
        assert_eq!(piece.article, "Artículo: Lycra");
        assert_eq!(piece.color, "Color: Negro");
        assert_eq!(piece.measure, "Medida: 22.40 kg");
        assert_eq!(piece.source, PieceSource::Importado);
        assert!(piece.cod_articulo.is_none());

        let original = piece.original_data.unwrap();
        assert_eq!(original["NumeroPieza"], "54999000");
        assert_eq!(original["peso"], "22.40");
        assert_eq!(original["codigoCompleto"], "54999000       022.40");
    }

    #[test]
    fn default_config_targets_tango_instance() {
        let cfg = ImportadoConfig::default();
        assert_eq!(cfg.host, "TANGO");
        assert_eq!(cfg.instance.as_deref(), Some("AXSQLEXPRESS"));
        assert_eq!(cfg.database, "LA_NUEVA_TEXTIL");
        assert_eq!(cfg.request_timeout_secs, 30);
    }

    #[tokio::test]
    async fn static_source_returns_records() {
        let src = StaticSource::new(vec![record("1", "a", "b")]);
        assert_eq!(src.load_all().await.unwrap().len(), 1);
    }
}
