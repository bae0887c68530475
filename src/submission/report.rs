//! Composition of the notification document. `compose` is deterministic
//! given a submission and a timestamp, and does not touch the filesystem or
//! the network; the HTTP layer injects the clock.

use super::normalize::{format_cep, format_cnpj, format_phone};
use super::{Submission, PLACEHOLDER};
use chrono::{DateTime, Local};
use std::fmt::Write as _;

/// Discriminator value meaning "this address differs from the primary one".
/// Any other value, including an absent field, omits the section.
pub const DIFFERENT_FROM_PRIMARY: &str = "nao";

#[derive(Debug, Clone)]
pub struct ReportRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ReportSection {
    pub title: &'static str,
    pub rows: Vec<ReportRow>,
}

/// Immutable structured document built once per submission. The protocol
/// number is the correlation token embedded in the output for traceability.
#[derive(Debug, Clone)]
pub struct Report {
    pub received_at: String,
    pub protocol: i64,
    pub sections: Vec<ReportSection>,
}

pub fn compose(submission: &Submission, received_at: DateTime<Local>) -> Report {
    let mut sections = vec![company_section(submission)];
    sections.push(address_section(submission, "Endereço Principal", "Principal"));

    if submission.field("entregaIgual") == DIFFERENT_FROM_PRIMARY {
        sections.push(address_section(submission, "Endereço de Entrega", "Entrega"));
    }
    if submission.field("cobrancaIgual") == DIFFERENT_FROM_PRIMARY {
        sections.push(address_section(
            submission,
            "Endereço de Cobrança",
            "Cobranca",
        ));
    }

    sections.push(financial_section(submission));
    sections.push(banking_section(submission));

    Report {
        received_at: received_at.format("%d/%m/%Y %H:%M:%S").to_string(),
        protocol: received_at.timestamp_millis(),
        sections,
    }
}

fn row(label: &'static str, value: impl Into<String>) -> ReportRow {
    let value = value.into();
    let value = if value.trim().is_empty() {
        PLACEHOLDER.to_string()
    } else {
        value
    };
    ReportRow { label, value }
}

fn company_section(submission: &Submission) -> ReportSection {
    ReportSection {
        title: "Executivo / Empresa",
        rows: vec![
            row("Nome do Executivo", submission.field("nomeExecutivo")),
            row("Razão Social", submission.field("razaoSocial")),
            row("CNPJ", format_cnpj(submission.field("cnpj"))),
            row("Inscrição Estadual", submission.field("inscricaoEstadual")),
            row("E-mail", submission.field("emailPrincipal")),
            row("Telefone", format_phone(submission.field("telefonePrincipal"))),
        ],
    }
}

fn address_section(
    submission: &Submission,
    title: &'static str,
    suffix: &str,
) -> ReportSection {
    let field = |prefix: &str| submission.field(&format!("{prefix}{suffix}"));

    ReportSection {
        title,
        rows: vec![
            row("CEP", format_cep(field("cep"))),
            row("Logradouro", field("logradouro")),
            row("Número", field("numero")),
            row("Complemento", field("complemento")),
            row("Bairro", field("bairro")),
            row("Cidade/UF", city_region(field("cidade"), field("uf"))),
        ],
    }
}

/// Combined `Cidade/UF` cell. A lone separator carries no information, so
/// the row collapses to the placeholder when both sides are empty.
fn city_region(city: &str, region: &str) -> String {
    let city = city.trim();
    let region = region.trim();
    if city.is_empty() && region.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        format!("{city}/{region}")
    }
}

fn financial_section(submission: &Submission) -> ReportSection {
    ReportSection {
        title: "Financeiro",
        rows: vec![
            row("Contato Financeiro (Nome)", submission.field("nomeFinanceiro")),
            row("E-mail Financeiro", submission.field("emailFinanceiro")),
            row(
                "Telefone Financeiro",
                format_phone(submission.field("telefoneFinanceiro")),
            ),
        ],
    }
}

fn banking_section(submission: &Submission) -> ReportSection {
    ReportSection {
        title: "Dados Bancários",
        rows: vec![
            row("Banco", submission.field("nomeBanco")),
            row("Agência", submission.field("agencia")),
            row("Conta", submission.field("conta")),
            row("Tipo de Conta", submission.field("tipoConta")),
            row("PIX (opcional)", submission.field("chavePix")),
        ],
    }
}

pub fn render_html(report: &Report) -> String {
    let mut html = String::new();
    html.push_str("<div style=\"font-family:Arial,Helvetica,sans-serif;font-size:14px;color:#333;\">");
    html.push_str("<h1 style=\"margin:0 0 12px 0;\">Nova ficha cadastral (Pessoa Jurídica)</h1>");
    writeln!(
        html,
        "<p style=\"margin:0 0 8px 0;\">Recebida em {}</p>",
        escape_html(&report.received_at)
    )
    .expect("write received-at line");

    for section in &report.sections {
        writeln!(
            html,
            "<h2 style=\"margin:16px 0 8px 0;\">{}</h2>",
            escape_html(section.title)
        )
        .expect("write section title");
        html.push_str(
            "<table border=\"0\" cellpadding=\"6\" cellspacing=\"0\" style=\"width:100%;border:1px solid #eee;\">",
        );
        for row in &section.rows {
            writeln!(
                html,
                "<tr><td style=\"width:35%;background:#fafafa;border-bottom:1px solid #eee;\"><strong>{}</strong></td><td style=\"border-bottom:1px solid #eee;\">{}</td></tr>",
                escape_html(row.label),
                escape_html(&row.value)
            )
            .expect("write report row");
        }
        html.push_str("</table>");
    }

    writeln!(
        html,
        "<p style=\"margin-top:16px;\">Protocolo: <strong>{}</strong></p>",
        report.protocol
    )
    .expect("write protocol line");
    html.push_str("</div>");

    html
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_clock() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 8, 23, 9, 30, 0)
            .single()
            .expect("unambiguous local time")
    }

    fn sample_submission() -> Submission {
        let mut submission = Submission::new();
        submission.insert("nomeExecutivo", "Maria Souza");
        submission.insert("razaoSocial", "Acme Indústria Ltda");
        submission.insert("cnpj", "12345678000199");
        submission.insert("emailPrincipal", "contato@acme.com.br");
        submission.insert("telefonePrincipal", "11987654321");
        submission.insert("cepPrincipal", "01310100");
        submission.insert("logradouroPrincipal", "Av. Paulista");
        submission.insert("numeroPrincipal", "1000");
        submission.insert("bairroPrincipal", "Bela Vista");
        submission.insert("cidadePrincipal", "São Paulo");
        submission.insert("ufPrincipal", "SP");
        submission
    }

    #[test]
    fn compose_orders_sections_and_normalizes_identifiers() {
        let report = compose(&sample_submission(), fixed_clock());

        let titles: Vec<_> = report.sections.iter().map(|s| s.title).collect();
        assert_eq!(
            titles,
            vec![
                "Executivo / Empresa",
                "Endereço Principal",
                "Financeiro",
                "Dados Bancários"
            ]
        );

        let company = &report.sections[0];
        assert_eq!(company.rows[2].label, "CNPJ");
        assert_eq!(company.rows[2].value, "12.345.678/0001-99");
        assert_eq!(company.rows[5].value, "(11) 98765-4321");

        let address = &report.sections[1];
        assert_eq!(address.rows[0].value, "01310-100");
        assert_eq!(address.rows[5].value, "São Paulo/SP");
    }

    #[test]
    fn conditional_sections_follow_their_discriminators() {
        let mut submission = sample_submission();
        submission.insert("cobrancaIgual", "nao");
        submission.insert("cepCobranca", "20040030");
        submission.insert("cidadeCobranca", "Rio de Janeiro");
        submission.insert("ufCobranca", "RJ");

        let report = compose(&submission, fixed_clock());
        let titles: Vec<_> = report.sections.iter().map(|s| s.title).collect();
        assert!(titles.contains(&"Endereço de Cobrança"));
        assert!(!titles.contains(&"Endereço de Entrega"));

        submission.insert("entregaIgual", "sim");
        let report = compose(&submission, fixed_clock());
        assert!(!report
            .sections
            .iter()
            .any(|s| s.title == "Endereço de Entrega"));

        submission.insert("entregaIgual", "nao");
        let report = compose(&submission, fixed_clock());
        assert!(report
            .sections
            .iter()
            .any(|s| s.title == "Endereço de Entrega"));
    }

    #[test]
    fn empty_submission_renders_placeholders_everywhere() {
        let report = compose(&Submission::new(), fixed_clock());

        assert_eq!(report.sections.len(), 4);
        for section in &report.sections {
            for row in &section.rows {
                assert_eq!(row.value, PLACEHOLDER, "row '{}' not blank", row.label);
            }
        }
    }

    #[test]
    fn city_region_collapses_to_placeholder_only_when_both_sides_empty() {
        assert_eq!(city_region("", ""), "-");
        assert_eq!(city_region("São Paulo", ""), "São Paulo/");
        assert_eq!(city_region("", "SP"), "/SP");
    }

    #[test]
    fn protocol_derives_from_the_clock() {
        let clock = fixed_clock();
        let report = compose(&Submission::new(), clock);
        assert_eq!(report.protocol, clock.timestamp_millis());
    }

    #[test]
    fn render_html_escapes_values_and_embeds_protocol() {
        let mut submission = Submission::new();
        submission.insert("razaoSocial", "<b>Acme & Co</b>");

        let report = compose(&submission, fixed_clock());
        let html = render_html(&report);

        assert!(html.contains("&lt;b&gt;Acme &amp; Co&lt;/b&gt;"));
        assert!(!html.contains("<b>Acme"));
        assert!(html.contains(&format!("Protocolo: <strong>{}</strong>", report.protocol)));
        assert!(html.contains("Nova ficha cadastral (Pessoa Jurídica)"));
    }
}
