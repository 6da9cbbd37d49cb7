use anyhow::{anyhow, Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::json;
use tracing::{debug, error, info};

use crate::data::backend::CrudBackend;
use crate::data::crud_item::{CreateCrudItemInput, CrudItem, UpdateCrudItemInput};
use crate::data::query::{Page, PaginationOptions};

const TABLE: &str = "crud_items";

/// Backend speaking the PostgREST dialect used by hosted Postgres services.
///
/// Filters, ordering and the row range are all pushed to the server; the
/// exact row count comes back in the `Content-Range` header.
#[derive(Clone)]
pub struct RestBackend {
    base_url: String,
    api_key: String,
    access_token: Option<String>,
    client: Client,
}

impl RestBackend {
    pub fn new(base_url: &str, api_key: &str, access_token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            access_token,
            client: Client::new(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, TABLE)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(&self.api_key)?);
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", bearer))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.headers(self.headers()?).send()?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            error!(target: "backend", "Request failed with {}: {}", status, body);
            return Err(anyhow!("API Error ({}): {}", status, body));
        }
        Ok(response)
    }

    /// Take the single row a `return=representation` write sends back
    fn single_item(response: Response) -> Result<CrudItem> {
        let mut items: Vec<CrudItem> = response.json()?;
        items
            .pop()
            .ok_or_else(|| anyhow!("Server returned no row"))
    }
}

/// Query string for a page request, in PostgREST syntax
pub fn build_page_query(
    user_id: &str,
    offset: usize,
    options: &PaginationOptions,
) -> Vec<(String, String)> {
    let mut params = vec![
        ("select".to_string(), "*".to_string()),
        ("user_id".to_string(), format!("eq.{}", user_id)),
    ];

    if let Some(statuses) = options.filters.active_statuses() {
        let list: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
        params.push(("status".to_string(), format!("in.({})", list.join(","))));
    }

    if !options.filters.category.is_empty() {
        params.push((
            "category".to_string(),
            format!("in.({})", options.filters.category.join(",")),
        ));
    }

    if let Some(search) = options.filters.search_text() {
        params.push((
            "or".to_string(),
            format!(
                "(title.ilike.*{s}*,subtitle.ilike.*{s}*,description.ilike.*{s}*)",
                s = search
            ),
        ));
    }

    let direction = if options.order_by.ascending {
        "asc"
    } else {
        "desc"
    };
    params.push((
        "order".to_string(),
        format!("{}.{}", options.order_by.column, direction),
    ));
    params.push(("offset".to_string(), offset.to_string()));
    params.push(("limit".to_string(), options.page_size.to_string()));
    params
}

/// Parse the total out of a `Content-Range` header such as `0-19/57` or `*/0`
pub fn parse_content_range_total(header: &str) -> Option<usize> {
    let (_, total) = header.split_once('/')?;
    total.trim().parse().ok()
}

impl CrudBackend for RestBackend {
    fn fetch_page(
        &self,
        user_id: &str,
        offset: usize,
        options: &PaginationOptions,
    ) -> Result<Page<CrudItem>> {
        let params = build_page_query(user_id, offset, options);
        debug!(target: "backend", "GET {} {:?}", self.table_url(), params);

        let response = self.send(
            self.client
                .get(self.table_url())
                .query(&params)
                .header("Prefer", "count=exact"),
        )?;

        let total = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total);

        let data: Vec<CrudItem> = response
            .json()
            .context("Failed to decode crud_items page")?;

        Ok(match total {
            Some(total) => Page::from_range(data, offset, total),
            // Without a count, a full page means there may be more
            None => Page {
                has_more: data.len() >= options.page_size,
                data,
                total: None,
            },
        })
    }

    fn get_item(&self, item_id: &str, user_id: &str) -> Result<Option<CrudItem>> {
        let response = self.send(self.client.get(self.table_url()).query(&[
            ("select", "*".to_string()),
            ("id", format!("eq.{}", item_id)),
            ("user_id", format!("eq.{}", user_id)),
        ]))?;
        let mut items: Vec<CrudItem> = response.json()?;
        Ok(items.pop())
    }

    fn create_item(&self, user_id: &str, input: &CreateCrudItemInput) -> Result<CrudItem> {
        input.validate()?;
        let body = json!({
            "user_id": user_id,
            "title": input.title,
            "subtitle": input.subtitle.as_deref().filter(|s| !s.is_empty()),
            "description": input.description.as_deref().filter(|s| !s.is_empty()),
            "category": input.category,
            "status": input.status.unwrap_or_default(),
            "image_url": input.image_url.as_deref().filter(|s| !s.is_empty()),
        });

        let response = self.send(
            self.client
                .post(self.table_url())
                .header("Prefer", "return=representation")
                .json(&body),
        )?;
        let item = Self::single_item(response)?;
        info!(target: "backend", "Created item {}", item.id);
        Ok(item)
    }

    fn update_item(
        &self,
        item_id: &str,
        user_id: &str,
        updates: &UpdateCrudItemInput,
    ) -> Result<CrudItem> {
        let response = self.send(
            self.client
                .patch(self.table_url())
                .query(&[
                    ("id", format!("eq.{}", item_id)),
                    ("user_id", format!("eq.{}", user_id)),
                ])
                .header("Prefer", "return=representation")
                .json(updates),
        )?;
        Self::single_item(response)
    }

    fn delete_item(&self, item_id: &str, user_id: &str) -> Result<()> {
        self.send(self.client.delete(self.table_url()).query(&[
            ("id", format!("eq.{}", item_id)),
            ("user_id", format!("eq.{}", user_id)),
        ]))?;
        info!(target: "backend", "Deleted item {}", item_id);
        Ok(())
    }

    fn name(&self) -> &str {
        "rest"
    }
}
