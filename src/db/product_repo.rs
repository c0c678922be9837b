// src/db/product_repo.rs

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{Executor, PgConnection, Postgres};

use crate::{
    common::error::AppError,
    models::product::{LabelRow, ProductDetailRow, ProductSummary, ReceiptLine, StockLine},
};

// Colunas brutas da precificação; a cascata é resolvida em `services::pricing`.
macro_rules! pricing_columns {
    () => {
        r#"
        CAST(pc.Prc_Promoc AS NUMERIC)    AS promo,
        CAST(px.Prc_Venda AS NUMERIC)     AS standard,
        CAST(pc.Per_Descon AS NUMERIC)    AS discount_a,
        CAST(pc.Per_Dsc2 AS NUMERIC)      AS discount_b,
        CAST(pl.Per_AcrAutPrc AS NUMERIC) AS surcharge_pct,
        CAST(pl.Per_DscAutPrc AS NUMERIC) AS auto_discount_pct
        "#
    };
}

const SEARCH_PRODUCTS: &str = r#"
    SELECT DISTINCT
        CAST(Codigo AS BIGINT)  AS code,
        CAST(Descricao AS TEXT) AS description,
        CAST(Cod_EAN AS TEXT)   AS ean
    FROM PRODU
    WHERE CAST(Codigo AS TEXT) ILIKE $1
       OR CAST(Cod_EAN AS TEXT) ILIKE $1
       OR CAST(Descricao AS TEXT) ILIKE $1
    ORDER BY description
"#;

const FIND_PRODUCT_DETAIL: &str = concat!(
    r#"
    SELECT
        CAST(pc.Cod_Produt AS BIGINT)   AS code,
        CAST(pr.Descricao AS TEXT)      AS description,
        CAST(fa.Fantasia AS TEXT)       AS manufacturer,
        CAST(pr.Unidade_Venda AS TEXT)  AS unit,
        CAST(pr.Cod_EAN AS TEXT)        AS ean,
    "#,
    pricing_columns!(),
    r#"
    FROM PCXPR pc
    INNER JOIN PRODU pr ON pc.Cod_Produt = pr.Codigo
    INNER JOIN PRXAP pa ON pc.Cod_Produt = pa.Cod_Produt AND pa.Flg_Padrao = 1
    INNER JOIN FABRI fa ON pr.Cod_Fabricante = fa.Codigo
    LEFT JOIN PRXES px ON pc.Cod_Produt = px.Cod_Produt AND px.Cod_Estabe = 0
    INNER JOIN POCOM pl ON pc.Id_PolCom = pl.Id_PolCom
    WHERE pc.Cod_Produt = $1 AND pc.Id_PolCom = $2
    "#
);

// Estoque físico endereçado (PRLTL) + saldo por lote (PRLOT), sem deduplicar.
const LIST_STOCK: &str = r#"
    SELECT
        CAST(dp.Cod_Lote AS TEXT)      AS lot_code,
        CAST(dp.Dat_Vencim AS DATE)    AS expiry_date,
        CAST(dp.Qtd_Fisico AS NUMERIC) AS quantity,
        CAST(dp.Cod_Dep AS TEXT)       AS warehouse,
        CONCAT_WS('.', dp.Num_Rua, dp.Num_Col, dp.Num_Niv, dp.Num_Apt) AS location,
        CAST('Fisico' AS TEXT)         AS origin
    FROM PRLTL dp
    WHERE dp.Cod_Estabe = 0 AND dp.Cod_Produt = $1 AND dp.Qtd_Fisico > 0
    UNION ALL
    SELECT
        CAST(fr.Cod_Lote AS TEXT),
        CAST(fr.Dat_Vencim AS DATE),
        CAST(fr.Qtd_Fisico AS NUMERIC),
        CAST(fr.Cod_Dep AS TEXT),
        CAST(d.Cod_LocFis AS TEXT),
        CAST('Lote' AS TEXT)
    FROM PRLOT fr
    INNER JOIN DPXPR d
        ON fr.Cod_Estabe = d.Cod_Estabe AND fr.Cod_Dep = d.Cod_Dep AND fr.Cod_Produt = d.Cod_Produt
    WHERE fr.Cod_Estabe = 0 AND fr.Cod_Produt = $1 AND fr.Qtd_Fisico > 0
"#;

// Notas de compra ('C') confirmadas ('F') no período.
const LIST_RECEIPTS: &str = r#"
    SELECT
        CAST(it.Dat_Movimento AS TIMESTAMP) AS movement_date,
        CAST(cb.Numero AS TEXT)             AS document_number,
        CAST(cb.Tip_NF AS TEXT)             AS document_type,
        CAST(it.Cod_Lote AS TEXT)           AS lot_code,
        CAST(it.Qtd_Pedido + it.Qtd_Bonificacao AS NUMERIC) AS total_quantity,
        (SELECT CAST(f.Razao_Social AS TEXT) FROM FORNE f WHERE f.Codigo = cb.Cod_EmiFornec) AS supplier
    FROM NFECB cb
    INNER JOIN NFEIT it ON cb.Protocolo = it.Protocolo
    WHERE cb.Status = 'F'
      AND it.Cod_Produto = $1
      AND it.Dat_Movimento BETWEEN $2 AND $3
      AND cb.Tip_NF = 'C'
    ORDER BY it.Dat_Movimento DESC
"#;

const FIND_LABEL: &str = concat!(
    r#"
    SELECT
        CAST(pc.Cod_Produt AS BIGINT)  AS code,
        CAST(pr.Descricao AS TEXT)     AS description,
        CAST(pr.Unidade_Venda AS TEXT) AS unit,
        CAST(pr.Cod_EAN AS TEXT)       AS ean,
        CAST(pc.Qtd_Min2 AS NUMERIC)   AS wholesale_min_qty,
    "#,
    pricing_columns!(),
    r#"
    FROM PCXPR pc
    INNER JOIN PRODU pr ON pc.Cod_Produt = pr.Codigo
    INNER JOIN PRXES px ON pc.Cod_Produt = px.Cod_Produt
    INNER JOIN POCOM pl ON pc.Id_PolCom = pl.Id_PolCom
    WHERE pc.Id_PolCom = $2
      AND px.Cod_Estabe = 0
      AND pc.Cod_Produt = $1
    "#
);

/// As consultas do ERP que os serviços usam, sobre a conexão da requisição.
#[async_trait]
pub trait ProductSource: Send {
    fn policy_id(&self) -> i32;

    async fn search_products(&mut self, term: &str) -> Result<Vec<ProductSummary>, AppError>;

    async fn find_product_detail(&mut self, code: i64) -> Result<Option<ProductDetailRow>, AppError>;

    async fn list_stock(&mut self, code: i64) -> Result<Vec<StockLine>, AppError>;

    async fn list_receipts(
        &mut self,
        code: i64,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<ReceiptLine>, AppError>;

    async fn find_label(&mut self, code: i64) -> Result<Option<LabelRow>, AppError>;
}

// O repositório das consultas fixas do ERP (produto, preço, estoque, entradas).
#[derive(Debug, Clone)]
pub struct ProductRepository {
    policy_id: i32,
}

impl ProductRepository {
    pub fn new(policy_id: i32) -> Self {
        Self { policy_id }
    }

    pub fn policy_id(&self) -> i32 {
        self.policy_id
    }

    pub fn session<'c>(&'c self, conn: &'c mut PgConnection) -> ErpSession<'c> {
        ErpSession { repo: self, conn }
    }

    /// Código, EAN ou descrição contendo o termo (sem diferenciar maiúsculas).
    pub async fn search_products<'e, E>(
        &self,
        executor: E,
        term: &str,
    ) -> Result<Vec<ProductSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, ProductSummary>(SEARCH_PRODUCTS)
            .bind(like_pattern(term))
            .fetch_all(executor)
            .await?;
        Ok(products)
    }

    pub async fn find_product_detail<'e, E>(
        &self,
        executor: E,
        code: i64,
    ) -> Result<Option<ProductDetailRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ProductDetailRow>(FIND_PRODUCT_DETAIL)
            .bind(code)
            .bind(self.policy_id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    pub async fn list_stock<'e, E>(&self, executor: E, code: i64) -> Result<Vec<StockLine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lines = sqlx::query_as::<_, StockLine>(LIST_STOCK)
            .bind(code)
            .fetch_all(executor)
            .await?;
        Ok(lines)
    }

    pub async fn list_receipts<'e, E>(
        &self,
        executor: E,
        code: i64,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<ReceiptLine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lines = sqlx::query_as::<_, ReceiptLine>(LIST_RECEIPTS)
            .bind(code)
            .bind(from)
            .bind(until)
            .fetch_all(executor)
            .await?;
        Ok(lines)
    }

    pub async fn find_label<'e, E>(&self, executor: E, code: i64) -> Result<Option<LabelRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, LabelRow>(FIND_LABEL)
            .bind(code)
            .bind(self.policy_id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }
}

// Repositório + conexão aberta para uma requisição.
pub struct ErpSession<'c> {
    repo: &'c ProductRepository,
    conn: &'c mut PgConnection,
}

#[async_trait]
impl ProductSource for ErpSession<'_> {
    fn policy_id(&self) -> i32 {
        self.repo.policy_id
    }

    async fn search_products(&mut self, term: &str) -> Result<Vec<ProductSummary>, AppError> {
        self.repo.search_products(&mut *self.conn, term).await
    }

    async fn find_product_detail(&mut self, code: i64) -> Result<Option<ProductDetailRow>, AppError> {
        self.repo.find_product_detail(&mut *self.conn, code).await
    }

    async fn list_stock(&mut self, code: i64) -> Result<Vec<StockLine>, AppError> {
        self.repo.list_stock(&mut *self.conn, code).await
    }

    async fn list_receipts(
        &mut self,
        code: i64,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<ReceiptLine>, AppError> {
        self.repo.list_receipts(&mut *self.conn, code, from, until).await
    }

    async fn find_label(&mut self, code: i64) -> Result<Option<LabelRow>, AppError> {
        self.repo.find_label(&mut *self.conn, code).await
    }
}

// `%termo%` com os curingas do LIKE escapados: o termo casa literalmente.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern("arroz"), "%arroz%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("A_B"), "%A\\_B%");
        assert_eq!(like_pattern("c:\\x"), "%c:\\\\x%");
    }

    #[test]
    fn queries_are_bound_to_the_configured_policy() {
        assert!(FIND_PRODUCT_DETAIL.contains("pc.Id_PolCom = $2"));
        assert!(FIND_LABEL.contains("pc.Id_PolCom = $2"));
        assert_eq!(ProductRepository::new(432).policy_id(), 432);
    }

    #[test]
    fn stock_query_keeps_duplicates_across_sources() {
        assert!(LIST_STOCK.contains("UNION ALL"));
        assert!(!LIST_STOCK.contains("DISTINCT"));
    }

    #[test]
    fn pricing_columns_match_the_row_fields() {
        for column in ["promo", "standard", "discount_a", "discount_b", "surcharge_pct", "auto_discount_pct"] {
            assert!(FIND_PRODUCT_DETAIL.contains(&format!("AS {column}")));
            assert!(FIND_LABEL.contains(&format!("AS {column}")));
        }
    }

    // --- Contra um Postgres real (fixture em `fixtures/erp.sql`) ---
    // DATABASE_URL=postgres://... cargo test -- --ignored

    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    #[sqlx::test(migrations = false, fixtures("erp"))]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn search_matches_term_and_orders_by_description(pool: PgPool) {
        let repo = ProductRepository::new(432);

        let found = repo.search_products(&pool, "arroz").await.unwrap();
        let codes: Vec<i64> = found.iter().map(|p| p.code).collect();
        assert_eq!(codes, vec![3, 1]);
        assert!(found
            .iter()
            .all(|p| p.description.as_deref().unwrap_or_default().contains("ARROZ")));

        let by_ean = repo.search_products(&pool, "7891234567895").await.unwrap();
        assert_eq!(by_ean.len(), 1);
        assert_eq!(by_ean[0].code, 1);
    }

    #[sqlx::test(migrations = false, fixtures("erp"))]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn search_treats_wildcards_literally(pool: PgPool) {
        let repo = ProductRepository::new(432);

        let found = repo.search_products(&pool, "50%").await.unwrap();
        let codes: Vec<i64> = found.iter().map(|p| p.code).collect();
        assert_eq!(codes, vec![4]);
    }

    #[sqlx::test(migrations = false, fixtures("erp"))]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn detail_is_bound_to_the_policy(pool: PgPool) {
        let row = ProductRepository::new(432)
            .find_product_detail(&pool, 1)
            .await
            .unwrap()
            .expect("produto 1 tem preço na política 432");
        assert_eq!(row.manufacturer.as_deref(), Some("CAMIL"));
        assert_eq!(row.pricing.promo, Some(Decimal::from(110)));
        assert_eq!(row.pricing.standard, Some(Decimal::from(100)));
        assert_eq!(row.pricing.discount_a, Some(Decimal::from(10)));

        assert!(ProductRepository::new(432).find_product_detail(&pool, 3).await.unwrap().is_none());
        assert!(ProductRepository::new(7).find_product_detail(&pool, 1).await.unwrap().is_none());

        let other_policy = ProductRepository::new(900).find_product_detail(&pool, 2).await.unwrap();
        assert_eq!(other_policy.unwrap().pricing.surcharge_pct, Some(Decimal::from(5)));
    }

    #[sqlx::test(migrations = false, fixtures("erp"))]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn lot_in_both_tables_gives_two_stock_lines(pool: PgPool) {
        let lines = ProductRepository::new(432).list_stock(&pool, 1).await.unwrap();

        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.lot_code.as_deref() == Some("L1")));
        assert!(lines.iter().all(|l| l.quantity == Decimal::from(12)));

        let physical = lines.iter().find(|l| l.origin == "Fisico").unwrap();
        assert_eq!(physical.location.as_deref(), Some("1.2.3.4"));
        let lot = lines.iter().find(|l| l.origin == "Lote").unwrap();
        assert_eq!(lot.location.as_deref(), Some("A-01"));
    }

    #[sqlx::test(migrations = false, fixtures("erp"))]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn receipts_are_confirmed_purchases_in_the_window(pool: PgPool) {
        let lines = ProductRepository::new(432)
            .list_receipts(&pool, 1, at(2026, 7, 21, 0, 0), at(2026, 10, 19, 23, 59))
            .await
            .unwrap();

        let numbers: Vec<&str> = lines.iter().filter_map(|l| l.document_number.as_deref()).collect();
        assert_eq!(numbers, vec!["1002", "1001"]);
        assert_eq!(lines[1].total_quantity, Some(Decimal::from(12)));
        assert_eq!(lines[0].supplier.as_deref(), Some("DISTRIBUIDORA SUL LTDA"));
    }

    #[sqlx::test(migrations = false, fixtures("erp"))]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn session_runs_the_same_queries_on_one_connection(pool: PgPool) {
        let repo = ProductRepository::new(432);
        let mut conn = pool.acquire().await.unwrap();
        let mut session = repo.session(&mut *conn);

        assert_eq!(session.policy_id(), 432);
        let label = session.find_label(1).await.unwrap().unwrap();
        assert_eq!(label.wholesale_min_qty, Some(Decimal::from(6)));
        assert!(session.find_label(3).await.unwrap().is_none());
        assert_eq!(session.list_stock(1).await.unwrap().len(), 2);
    }
}
