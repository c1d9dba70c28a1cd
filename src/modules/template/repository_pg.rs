use std::collections::HashMap;

use crate::api::error;
use crate::modules::template::model::{CardComponentNode, CardNode, ComponentNode, TemplateTree};
use crate::modules::template::repository::TemplateRepository;
use crate::modules::template::schema::{
    CarouselButtonEntity, CarouselCardComponentEntity, CarouselCardEntity, TemplateButtonEntity,
    TemplateComponentEntity, TemplateEntity,
};

#[derive(Clone)]
pub struct TemplatePgRepository {
    pool: sqlx::PgPool,
}

impl TemplatePgRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

fn group_by<T, F>(items: Vec<T>, key: F) -> HashMap<i64, Vec<T>>
where
    F: Fn(&T) -> i64,
{
    let mut map: HashMap<i64, Vec<T>> = HashMap::new();
    for item in items {
        map.entry(key(&item)).or_default().push(item);
    }
    map
}

#[async_trait::async_trait]
impl TemplateRepository for TemplatePgRepository {
    async fn find_batch_by_project_and_names(
        &self,
        project_id: i64,
        names: &[String],
    ) -> Result<Vec<TemplateTree>, error::SystemError> {
        let templates = sqlx::query_as::<_, TemplateEntity>(
            r#"
            SELECT id, organization_id, project_id, waba_account_id, name,
                   category, language, status, created_at, updated_at, deleted_at
            FROM whatsapp_templates
            WHERE project_id = $1
              AND name = ANY($2)
              AND deleted_at IS NULL
            ORDER BY id ASC
            "#,
        )
        .bind(project_id)
        .bind(names)
        .fetch_all(&self.pool)
        .await?;

        if templates.is_empty() {
            return Ok(Vec::new());
        }

        let template_ids: Vec<i64> = templates.iter().map(|t| t.id).collect();

        let components = sqlx::query_as::<_, TemplateComponentEntity>(
            r#"
            SELECT id, template_id, component_type, format, text, media_handle,
                   media_url, add_security_recommendation, code_expiration_minutes,
                   component_order
            FROM whatsapp_template_components
            WHERE template_id = ANY($1)
            ORDER BY component_order ASC, id ASC
            "#,
        )
        .bind(&template_ids)
        .fetch_all(&self.pool)
        .await?;

        let component_ids: Vec<i64> = components.iter().map(|c| c.id).collect();

        let buttons = sqlx::query_as::<_, TemplateButtonEntity>(
            r#"
            SELECT id, component_id, button_type, text, url, phone_number,
                   otp_type, button_index
            FROM whatsapp_template_buttons
            WHERE component_id = ANY($1)
            ORDER BY button_index ASC
            "#,
        )
        .bind(&component_ids)
        .fetch_all(&self.pool)
        .await?;

        let cards = sqlx::query_as::<_, CarouselCardEntity>(
            r#"
            SELECT id, component_id, card_index
            FROM whatsapp_template_carousel_cards
            WHERE component_id = ANY($1)
            ORDER BY card_index ASC
            "#,
        )
        .bind(&component_ids)
        .fetch_all(&self.pool)
        .await?;

        let card_ids: Vec<i64> = cards.iter().map(|c| c.id).collect();

        let card_components = sqlx::query_as::<_, CarouselCardComponentEntity>(
            r#"
            SELECT id, card_id, component_type, format, text, media_handle, media_url
            FROM whatsapp_template_carousel_card_components
            WHERE card_id = ANY($1)
            ORDER BY id ASC
            "#,
        )
        .bind(&card_ids)
        .fetch_all(&self.pool)
        .await?;

        let card_component_ids: Vec<i64> = card_components.iter().map(|c| c.id).collect();

        let carousel_buttons = sqlx::query_as::<_, CarouselButtonEntity>(
            r#"
            SELECT id, card_component_id, button_type, text, url, phone_number, button_index
            FROM whatsapp_template_carousel_buttons
            WHERE card_component_id = ANY($1)
            ORDER BY button_index ASC
            "#,
        )
        .bind(&card_component_ids)
        .fetch_all(&self.pool)
        .await?;

        // Assemble bottom-up.
        let mut carousel_buttons_by_parent = group_by(carousel_buttons, |b| b.card_component_id);
        let mut card_components_by_card = group_by(card_components, |c| c.card_id);
        let mut cards_by_component = group_by(cards, |c| c.component_id);
        let mut buttons_by_component = group_by(buttons, |b| b.component_id);
        let mut components_by_template = group_by(components, |c| c.template_id);

        let trees = templates
            .into_iter()
            .map(|template| {
                let components = components_by_template
                    .remove(&template.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|component| {
                        let cards = cards_by_component
                            .remove(&component.id)
                            .unwrap_or_default()
                            .into_iter()
                            .map(|card| {
                                let components = card_components_by_card
                                    .remove(&card.id)
                                    .unwrap_or_default()
                                    .into_iter()
                                    .map(|sub| CardComponentNode {
                                        buttons: carousel_buttons_by_parent
                                            .remove(&sub.id)
                                            .unwrap_or_default(),
                                        component: sub,
                                    })
                                    .collect();
                                CardNode { card, components }
                            })
                            .collect();
                        ComponentNode {
                            buttons: buttons_by_component
                                .remove(&component.id)
                                .unwrap_or_default(),
                            component,
                            cards,
                        }
                    })
                    .collect();
                TemplateTree { template, components }
            })
            .collect();

        Ok(trees)
    }
}
