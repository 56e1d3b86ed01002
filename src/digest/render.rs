use crate::digest::DigestBatch;
use chrono::{Datelike, NaiveDate};

/// Email bodies are assembled by hand rather than templated. The layout
/// is small enough that a template engine would be more ceremony than
/// markup, and inline styles are mandatory for mail clients anyway.

pub fn digest_subject(date: NaiveDate) -> String {
    format!("Your Daily News for {}", date.format("%Y-%m-%d"))
}

pub fn welcome_subject() -> &'static str {
    "Welcome to News Digest! 🗞️"
}

/// Renders a digest batch into a full HTML document. Topic sections
/// appear in batch order. All provider-supplied text is escaped.
pub fn digest_html(batch: &DigestBatch, dashboard_url: &str) -> String {
    let mut body = String::new();
    body.push_str(concat!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">",
        "<div style=\"background-color: #2563eb; padding: 20px; border-radius: 8px 8px 0 0;\">",
        "<h1 style=\"color: white; margin: 0; text-align: center;\">Your Daily Digest</h1>",
        "</div>",
        "<div style=\"border: 1px solid #e5e7eb; border-top: none; padding: 20px; ",
        "border-radius: 0 0 8px 8px;\">",
    ));

    for group in &batch.groups {
        body.push_str(&format!(
            "<h2 style=\"color: #1e40af; border-bottom: 2px solid #e5e7eb; \
             padding-bottom: 5px; margin-top: 20px; text-transform: capitalize;\">{}</h2>",
            html_escape::encode_text(&group.topic)
        ));
        body.push_str("<ul style=\"list-style-type: none; padding: 0;\">");
        for article in &group.articles {
            let description = article
                .description
                .as_deref()
                .unwrap_or("No description available.");
            body.push_str(&format!(
                "<li style=\"margin-bottom: 15px; border-bottom: 1px solid #f3f4f6; \
                 padding-bottom: 15px;\">\
                 <a href=\"{}\" style=\"color: #2563eb; text-decoration: none; \
                 font-weight: bold; font-size: 16px; display: block; margin-bottom: 5px;\">{}</a>\
                 <p style=\"margin: 0; color: #4b5563; font-size: 14px; line-height: 1.5;\">{}</p>\
                 <div style=\"margin-top: 5px; font-size: 12px; color: #9ca3af;\">Source: {}</div>\
                 </li>",
                html_escape::encode_double_quoted_attribute(&article.url),
                html_escape::encode_text(&article.title),
                html_escape::encode_text(description),
                html_escape::encode_text(&article.source_name),
            ));
        }
        body.push_str("</ul>");
    }

    body.push_str(&format!(
        "<p style=\"text-align: center; margin-top: 30px; font-size: 12px; color: #9ca3af;\">\
         You received this email because you subscribed to News Digest. \
         <a href=\"{}\" style=\"color: #2563eb;\">Unsubscribe</a></p></div></div>",
        html_escape::encode_double_quoted_attribute(dashboard_url),
    ));

    format!("<html><body>{}</body></html>", body)
}

/// One-time welcome mail, sent when a user first turns on their
/// subscription.
pub fn welcome_html(topics: &[String], dashboard_url: &str) -> String {
    let topic_list = html_escape::encode_text(&topics.join(", ")).into_owned();
    let year = chrono::Local::now().year();
    format!(
        "<html><body style=\"font-family: Arial, sans-serif; color: #333;\">\
         <div style=\"max-width: 600px; margin: 0 auto; border: 1px solid #eee; \
         border-radius: 8px; overflow: hidden;\">\
         <div style=\"background-color: #2563eb; padding: 20px; text-align: center;\">\
         <h1 style=\"color: white; margin: 0;\">Welcome Aboard!</h1></div>\
         <div style=\"padding: 20px;\">\
         <p>Hi there,</p>\
         <p>Thanks for subscribing to <strong>News Digest</strong>! You're now set up to \
         receive your personalized daily news updates every 12 hours.</p>\
         <p>We'll curate the best stories for your topics: <strong>{}</strong>.</p>\
         <div style=\"margin-top: 20px; text-align: center;\">\
         <a href=\"{}\" style=\"background-color: #2563eb; color: white; padding: 10px 20px; \
         text-decoration: none; border-radius: 5px;\">Manage Preferences</a></div></div>\
         <div style=\"background-color: #f8f9fa; padding: 10px; text-align: center; \
         font-size: 12px; color: #666;\">&copy; {} News Digest. All rights reserved.</div>\
         </div></body></html>",
        topic_list,
        html_escape::encode_double_quoted_attribute(dashboard_url),
        year,
    )
}
