//! # Business Assistant Chat
//!
//! Answers owner questions with a hosted language model, grounded in live
//! shop statistics.
//!
//! ```text
//! POST /api/chat {message}
//!       │
//!       ▼
//! ChatContext::build(transactions, counts)   ← totals via the invoice calculator
//!       │
//!       ▼
//! render_preamble() ──► GeminiClient::generate(preamble, message)
//!                              │
//!                              ▼
//!        POST {base}/v1beta/models/{model}:generateContent
//! ```
//!
//! The preamble and a canned model acknowledgement are sent as the first two
//! turns of the conversation, followed by the user's message.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use thiserror::Error;

use laundry_core::money::format_rupiah;
use laundry_core::report::{self, OutletActivity, TopMember};
use laundry_core::TransactionDetail;

/// Recent transactions listed in the preamble.
const RECENT_IN_CONTEXT: usize = 5;

/// Loyal members listed in the preamble.
const LOYAL_IN_CONTEXT: usize = 5;

const MODEL_ACK: &str = "Saya siap membantu Anda dengan informasi tentang sistem SmartLaundry. \
                         Silakan ajukan pertanyaan!";

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Chat model API key is not configured")]
    NotConfigured,

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Chat model returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Chat model returned no text")]
    EmptyReply,
}

// =============================================================================
// Context
// =============================================================================

/// Statistics returned to the caller alongside the reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatStats {
    pub total_transactions: usize,
    pub total_revenue: f64,
    pub total_members: i64,
    pub today_transactions: usize,
    pub month_transactions: usize,
}

#[derive(Debug, Clone)]
struct RecentLine {
    invoice_code: String,
    member: String,
    outlet: String,
    status: &'static str,
}

/// Everything the model is told about the shop.
#[derive(Debug, Clone)]
pub struct ChatContext {
    pub stats: ChatStats,
    total_outlets: i64,
    total_packages: i64,
    outlets: Vec<OutletActivity>,
    recent: Vec<RecentLine>,
    loyal: Vec<TopMember>,
}

impl ChatContext {
    /// Builds the context from every transaction, newest first.
    pub fn build(
        details: &[TransactionDetail],
        total_members: i64,
        total_outlets: i64,
        total_packages: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let dashboard = report::build_dashboard(details, total_members, now);

        let recent = details
            .iter()
            .take(RECENT_IN_CONTEXT)
            .map(|d| RecentLine {
                invoice_code: d.transaction.invoice_code.clone(),
                member: d
                    .transaction
                    .member_name
                    .clone()
                    .unwrap_or_else(|| "Guest".to_string()),
                outlet: d.transaction.outlet_name.clone().unwrap_or_default(),
                status: d.transaction.status.as_str(),
            })
            .collect();

        // Loyalty here is visit count, not spending
        let mut loyal = report::rank_members(details, usize::MAX);
        loyal.sort_by(|a, b| {
            b.transaction_count
                .cmp(&a.transaction_count)
                .then(a.name.cmp(&b.name))
        });
        loyal.truncate(LOYAL_IN_CONTEXT);

        ChatContext {
            stats: ChatStats {
                total_transactions: dashboard.total_transactions,
                total_revenue: dashboard.total_revenue,
                total_members,
                today_transactions: dashboard.today_transactions,
                month_transactions: dashboard.month_transactions,
            },
            total_outlets,
            total_packages,
            outlets: report::outlet_activity(details),
            recent,
            loyal,
        }
    }

    /// Renders the system preamble sent before the user's message.
    pub fn render_preamble(&self) -> String {
        let s = &self.stats;
        let mut out = String::new();

        out.push_str("# IDENTITAS & PERAN\n");
        out.push_str(
            "Anda adalah AI Business Assistant \"SmartLaundry\", sistem manajemen laundry profesional.\n\
             Tujuan: membantu owner/manager mengambil keputusan bisnis berbasis data secara cepat dan tepat.\n\n",
        );

        out.push_str("# DATA REAL-TIME SISTEM\n## Statistik Umum:\n");
        let _ = writeln!(out, "- Total Transaksi: {}", s.total_transactions);
        let _ = writeln!(out, "- Total Revenue: {}", format_rupiah(s.total_revenue));
        let _ = writeln!(out, "- Total Member: {}", s.total_members);
        let _ = writeln!(out, "- Total Outlet: {}", self.total_outlets);
        let _ = writeln!(out, "- Total Paket Layanan: {}", self.total_packages);
        let _ = writeln!(out, "- Transaksi Hari Ini: {}", s.today_transactions);
        let _ = writeln!(out, "- Transaksi Bulan Ini: {}", s.month_transactions);

        out.push_str("\n## Performa Outlet:\n");
        for (i, o) in self.outlets.iter().enumerate() {
            let _ = writeln!(out, "{}. {}: {} transaksi", i + 1, o.outlet_name, o.transactions);
        }

        out.push_str("\n## Transaksi Terbaru:\n");
        for (i, t) in self.recent.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. #{} - {} | {} | Status: {}",
                i + 1,
                t.invoice_code,
                t.member,
                t.outlet,
                t.status
            );
        }

        let _ = writeln!(out, "\n## Top {} Member Loyal:", LOYAL_IN_CONTEXT);
        for (i, m) in self.loyal.iter().enumerate() {
            let _ = writeln!(out, "{}. {} - {} transaksi", i + 1, m.name, m.transaction_count);
        }

        out.push_str(
            "\n# ATURAN KOMUNIKASI\n\
             1. Langsung ke inti; 1-3 kalimat, tambahkan kesimpulan singkat bila relevan.\n\
             2. Jawaban harus berbasis data di atas; jangan membuat angka baru.\n\
             3. Gunakan bahasa Indonesia profesional dan ramah.\n\
             4. Format Rupiah: Rp dan pemisah ribuan (contoh: Rp 1.250.000).\n\
             5. Berikan rekomendasi praktis yang dapat ditindaklanjuti bila diminta.\n\
             6. Hanya jawab hal terkait bisnis laundry dan data di atas.\n\n\
             # RESPONS KHUSUS\n\
             - Data tidak tersedia: \"Data [X] belum tersedia di sistem.\"\n\
             - Pertanyaan tidak relevan: \"Saya fokus membantu analisis bisnis laundry. \
             Ada yang bisa saya bantu terkait data laundry?\"\n",
        );

        out
    }
}

// =============================================================================
// Gemini Client
// =============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// HTTP client for the Generative Language `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        GeminiClient {
            client: Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            api_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends the preamble, the canned acknowledgement and `message`, and
    /// returns the model's reply text.
    pub async fn generate(&self, preamble: &str, message: &str) -> Result<String, ChatError> {
        let api_key = self.api_key.as_deref().ok_or(ChatError::NotConfigured)?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let request = GenerateRequest {
            contents: vec![
                Content {
                    role: "user",
                    parts: vec![Part { text: preamble }],
                },
                Content {
                    role: "model",
                    parts: vec![Part { text: MODEL_ACK }],
                },
                Content {
                    role: "user",
                    parts: vec![Part { text: message }],
                },
            ],
        };

        tracing::debug!(model = %self.model, "Calling chat model");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let reply: GenerateResponse = response.json().await?;
        let text: String = reply
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect();

        if text.trim().is_empty() {
            return Err(ChatError::EmptyReply);
        }

        Ok(text)
    }
}
