//! Token operations as the admin screens and the CLI invoke them.
//!
//! Every operation writes the option store first and the kit second. A kit
//! write that cannot complete is parked in the sync queue instead of being
//! reported as an error.

mod form;
mod rows;

pub use form::{ColorRow, FontRow, SaveForm};
pub use rows::TokenRows;

use std::path::Path;

use serde_json::Value;
use time::OffsetDateTime;

use crate::error::{AppError, AppResult};
use crate::exchange::{read_import_file, ExchangePayload, ExportSource, ImportedTokens};
use crate::host::{KitApi, KitHost, SyncStatus};
use crate::kit::KitCollections;
use crate::merge::{merge_kit, IdGenerator, MergePolicy, RandomIds};
use crate::normalize::options::{color_options_from_value, font_options_from_value};
use crate::normalize::{
    color_options, colors_from_kit, colors_from_options, font_options, fonts_from_kit,
    fonts_from_options, ColorOptions, FontOptions,
};
use crate::notification::{self, Notice};
use crate::queue::{DrainOutcome, DrainTrigger, PendingJob, SyncQueue};
use crate::section::{resolve_section, Section, SectionSource, SECTION_PREFERENCE_KEY};
use crate::storage::{DocumentStore, OptionStore, StorageError, UserId, UserMetaStore};
use crate::tokens::{title_key, ColorToken, FontToken};

pub const COLOR_OPTION_KEY: &str = "elementor_scheme_color";
pub const FONT_OPTION_KEY: &str = "elementor_scheme_typography";

/// Who is asking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// Command line; always allowed.
    Cli,
    Admin(AdminRequest),
}

/// Request context of an admin screen action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminRequest {
    pub user_id: UserId,
    pub can_manage_options: bool,
    pub referer: Option<String>,
    /// Hidden `edtm_current_section` form value.
    pub form_section: Option<String>,
}

/// What happened to the kit half of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KitSync {
    Applied,
    /// No active kit; the job waits in the queue.
    Queued,
    /// The kit write failed; the job waits in the queue.
    Failed,
}

impl KitSync {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Queued => "queued",
            Self::Failed => "failed",
        }
    }

    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Result of an operation plus, for admin callers, the panel to return to.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub section: Option<Section>,
}

pub struct TokenManager<'a> {
    options: &'a dyn OptionStore,
    user_meta: &'a dyn UserMetaStore,
    host: KitHost<'a>,
    ids: Box<dyn IdGenerator>,
    site: String,
}

impl<'a> TokenManager<'a> {
    pub fn new(
        options: &'a dyn OptionStore,
        user_meta: &'a dyn UserMetaStore,
        documents: &'a dyn DocumentStore,
        api: Option<&'a dyn KitApi>,
        site: impl Into<String>,
    ) -> Self {
        Self {
            options,
            user_meta,
            host: KitHost::new(api, documents, options),
            ids: Box::new(RandomIds),
            site: site.into(),
        }
    }

    pub fn with_ids(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Saves edited rows plus bulk text. The kit receives exactly the saved
    /// set.
    pub fn save(&mut self, caller: &Caller, form: SaveForm) -> AppResult<Outcome<KitSync>> {
        authorize(caller)?;
        let (colors, fonts) = form.into_tokens();
        tracing::debug!(colors = colors.len(), fonts = fonts.len(), "saving tokens");
        self.write_options(&colors, &fonts)?;
        let sync = self.apply_kit(colors, fonts, MergePolicy::Replace)?;
        self.finish(caller, sync)
    }

    /// Reads, validates and applies an exchange file.
    pub fn import_file(
        &mut self,
        caller: &Caller,
        path: &Path,
        mode: MergePolicy,
        preserve_ids: bool,
        limit: u64,
    ) -> AppResult<Outcome<KitSync>> {
        authorize(caller)?;
        let tokens = read_import_file(path, preserve_ids, limit)?;
        self.import_tokens(caller, tokens, mode)
    }

    /// The option store is overwritten in both modes; `mode` only decides
    /// whether kit records missing from the import survive.
    pub fn import_tokens(
        &mut self,
        caller: &Caller,
        tokens: ImportedTokens,
        mode: MergePolicy,
    ) -> AppResult<Outcome<KitSync>> {
        authorize(caller)?;
        let ImportedTokens { colors, fonts } = tokens;
        tracing::info!(
            colors = colors.len(),
            fonts = fonts.len(),
            mode = mode.as_str(),
            "importing tokens"
        );
        self.write_options(&colors, &fonts)?;
        let sync = self.apply_kit(colors, fonts, mode)?;
        self.finish(caller, sync)
    }

    pub fn export(
        &self,
        caller: &Caller,
        source: ExportSource,
        preserve_ids: bool,
    ) -> AppResult<Outcome<ExchangePayload>> {
        self.export_at(caller, source, preserve_ids, OffsetDateTime::now_utc())
    }

    pub fn export_at(
        &self,
        caller: &Caller,
        source: ExportSource,
        preserve_ids: bool,
        now: OffsetDateTime,
    ) -> AppResult<Outcome<ExchangePayload>> {
        authorize(caller)?;
        let (colors, fonts) = match source {
            ExportSource::Kit => {
                let kit = self.host.read()?.unwrap_or_default();
                (colors_from_kit(&kit.colors), fonts_from_kit(&kit.fonts))
            }
            ExportSource::Plugin => {
                let (color_opts, font_opts) = self.read_options()?;
                let mut colors = colors_from_options(&color_opts);
                let mut fonts = fonts_from_options(&font_opts);
                if preserve_ids {
                    self.adopt_kit_ids(&mut colors, &mut fonts)?;
                }
                (colors, fonts)
            }
        };
        tracing::debug!(source = source.as_str(), preserve_ids, "export built");
        let payload = ExchangePayload::build(self.site.clone(), colors, fonts, preserve_ids, now);
        self.finish(caller, payload)
    }

    /// Kit → option store. `None` when there is no kit to pull from; the
    /// option store is left alone in that case.
    pub fn pull(&self, caller: &Caller) -> AppResult<Outcome<Option<TokenRows>>> {
        authorize(caller)?;
        let pulled = match self.host.read()? {
            Some(kit) => {
                let mut rows = TokenRows {
                    colors: colors_from_kit(&kit.colors),
                    fonts: fonts_from_kit(&kit.fonts),
                };
                crate::exchange::strip_ids(&mut rows.colors, &mut rows.fonts);
                self.write_options(&rows.colors, &rows.fonts)?;
                Some(rows)
            }
            None => {
                tracing::warn!("no active kit to pull from");
                None
            }
        };
        self.finish(caller, pulled)
    }

    /// Option store → kit, dropping kit records the options do not name.
    pub fn push(&mut self, caller: &Caller) -> AppResult<Outcome<KitSync>> {
        self.send_options(caller, MergePolicy::Replace)
    }

    /// Option store → kit, keeping kit records the options do not name.
    pub fn sync(&mut self, caller: &Caller) -> AppResult<Outcome<KitSync>> {
        self.send_options(caller, MergePolicy::Merge)
    }

    /// Replays the queued job, if any.
    pub fn process_pending(&mut self, trigger: DrainTrigger) -> AppResult<DrainOutcome> {
        let mut queue = SyncQueue::load(self.options)?;
        let host = &self.host;
        let ids = self.ids.as_mut();
        let outcome = queue.drain(trigger, |job| {
            host.apply(|current| {
                merge_kit(current, &job.colors_norm, &job.fonts_norm, job.mode, &mut *ids)
            })
        })?;
        Ok(outcome)
    }

    /// Rows for the editing table: the queued job while one is waiting,
    /// otherwise the kit overlaid with option values.
    pub fn rows(&self, caller: &Caller) -> AppResult<Outcome<TokenRows>> {
        authorize(caller)?;
        let queue = SyncQueue::load(self.options)?;
        if let Some(job) = queue.pending()? {
            return self.finish(caller, TokenRows::from_pending(&job));
        }
        let kit = self.host.read()?.unwrap_or_default();
        let (colors, fonts) = self.read_options()?;
        self.finish(caller, TokenRows::overlay(&kit, &colors, &fonts))
    }

    /// Consumes the pending sync notice.
    pub fn take_notice(&self) -> Option<Notice> {
        notification::take(self.options)
    }

    fn send_options(&mut self, caller: &Caller, policy: MergePolicy) -> AppResult<Outcome<KitSync>> {
        authorize(caller)?;
        let (colors, fonts) = self.read_options()?;
        let sync = self.apply_kit(
            colors_from_options(&colors),
            fonts_from_options(&fonts),
            policy,
        )?;
        self.finish(caller, sync)
    }

    fn read_options(&self) -> AppResult<(ColorOptions, FontOptions)> {
        let colors = self
            .options
            .get(COLOR_OPTION_KEY)?
            .map(|value| color_options_from_value(&value))
            .unwrap_or_default();
        let fonts = self
            .options
            .get(FONT_OPTION_KEY)?
            .map(|value| font_options_from_value(&value))
            .unwrap_or_default();
        Ok((colors, fonts))
    }

    fn write_options(&self, colors: &[ColorToken], fonts: &[FontToken]) -> AppResult<()> {
        let color_map = color_options(colors);
        let font_map = font_options(fonts);
        let (color_count, font_count) = (color_map.len(), font_map.len());
        let encode = |err| AppError::from(StorageError::Encode(err));
        self.options
            .set(COLOR_OPTION_KEY, serde_json::to_value(color_map).map_err(encode)?)?;
        self.options
            .set(FONT_OPTION_KEY, serde_json::to_value(font_map).map_err(encode)?)?;
        tracing::info!(colors = color_count, fonts = font_count, "option store updated");
        Ok(())
    }

    fn apply_kit(
        &mut self,
        colors: Vec<ColorToken>,
        fonts: Vec<FontToken>,
        policy: MergePolicy,
    ) -> AppResult<KitSync> {
        let ids = self.ids.as_mut();
        let result = self
            .host
            .apply(|current| merge_kit(current, &colors, &fonts, policy, &mut *ids));

        let sync = match result {
            Ok(SyncStatus::Success) => return Ok(KitSync::Applied),
            Ok(SyncStatus::Queued) => KitSync::Queued,
            Err(err) => {
                tracing::warn!(%err, "kit write failed; queueing for retry");
                KitSync::Failed
            }
        };
        let mut queue = SyncQueue::load(self.options)?;
        queue.enqueue(&PendingJob::new(colors, fonts, policy))?;
        Ok(sync)
    }

    fn adopt_kit_ids(&self, colors: &mut [ColorToken], fonts: &mut [FontToken]) -> AppResult<()> {
        let Some(kit) = self.host.read()? else {
            return Ok(());
        };
        let KitCollections {
            colors: kit_colors,
            fonts: kit_fonts,
        } = kit;
        let color_ids = ids_by_title(colors_from_kit(&kit_colors).into_iter().map(|c| (c.title, c.id)));
        let font_ids = ids_by_title(fonts_from_kit(&kit_fonts).into_iter().map(|f| (f.title, f.id)));
        for color in colors.iter_mut() {
            if let Some(id) = color_ids.get(&title_key(&color.title)) {
                color.id = id.clone();
            }
        }
        for font in fonts.iter_mut() {
            if let Some(id) = font_ids.get(&title_key(&font.title)) {
                font.id = id.clone();
            }
        }
        Ok(())
    }

    fn finish<T>(&self, caller: &Caller, value: T) -> AppResult<Outcome<T>> {
        let section = match caller {
            Caller::Cli => None,
            Caller::Admin(request) => Some(self.remember_section(request)?),
        };
        Ok(Outcome { value, section })
    }

    fn remember_section(&self, request: &AdminRequest) -> AppResult<Section> {
        let stored = self.user_meta.get(request.user_id, SECTION_PREFERENCE_KEY)?;
        let preference = stored.as_ref().and_then(Value::as_str).unwrap_or("");

        let mut sources = Vec::with_capacity(3);
        if let Some(referer) = request.referer.as_deref() {
            sources.push(SectionSource::Referer(referer));
        }
        if let Some(form) = request.form_section.as_deref() {
            sources.push(SectionSource::Form(form));
        }
        sources.push(SectionSource::Preference(preference));

        let section = resolve_section(&sources);
        self.user_meta.set(
            request.user_id,
            SECTION_PREFERENCE_KEY,
            Value::from(section.as_str()),
        )?;
        tracing::debug!(user = request.user_id, section = section.as_str(), "section remembered");
        Ok(section)
    }
}

fn authorize(caller: &Caller) -> AppResult<()> {
    match caller {
        Caller::Admin(request) if !request.can_manage_options => {
            tracing::warn!(user = request.user_id, "token operation refused");
            Err(AppError::PermissionDenied {
                user_id: request.user_id,
            })
        }
        _ => Ok(()),
    }
}

/// Kit ids keyed by case-folded title; empty ids are skipped, the last
/// record of a title wins.
fn ids_by_title(
    pairs: impl Iterator<Item = (String, String)>,
) -> std::collections::HashMap<String, String> {
    pairs
        .filter(|(_, id)| !id.is_empty())
        .map(|(title, id)| (title_key(&title), id))
        .collect()
}
