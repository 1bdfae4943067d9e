//! 页面渲染：筛选表单与结果列表

use html_escape::encode_text;
use crate::models::screen::ScreenReport;

const TITLE: &str = "行业板块 DKBY 筛选工具";

/// 表单当前取值，渲染时原样回填
#[derive(Debug, Clone, Default)]
pub struct FormValues {
    pub threshold: f64,
    pub start: String,
    pub end: String,
}

fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"zh-CN\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>body{{font-family:sans-serif;max-width:720px;margin:2em auto}}\
         .success{{color:#1b7f3b}}.info{{color:#1f5fa8}}.error{{color:#b3261e}}\
         table{{border-collapse:collapse}}td,th{{padding:2px 10px;text-align:right}}td:first-child{{text-align:left}}</style>\n\
         </head>\n<body>\n<h1>{title}</h1>\n{body}</body>\n</html>\n",
        title = TITLE,
        body = body
    )
}

fn form(values: &FormValues) -> String {
    format!(
        "<form method=\"get\" action=\"/screen\">\n\
         <p><label>输入 DKBY long-short 差值阈值 \
         <input type=\"number\" name=\"threshold\" min=\"0\" step=\"0.1\" value=\"{threshold}\"></label></p>\n\
         <p><label>开始日期（留空=1 年前） <input type=\"date\" name=\"start\" value=\"{start}\"></label></p>\n\
         <p><label>结束日期（留空=今天） <input type=\"date\" name=\"end\" value=\"{end}\"></label></p>\n\
         <p><button type=\"submit\">开始筛选</button></p>\n\
         </form>\n",
        threshold = values.threshold,
        start = html_escape::encode_double_quoted_attribute(&values.start),
        end = html_escape::encode_double_quoted_attribute(&values.end),
    )
}

pub fn render_form(values: &FormValues) -> String {
    page(&form(values))
}

pub fn render_report(values: &FormValues, report: &ScreenReport) -> String {
    let mut body = form(values);

    body.push_str(&format!(
        "<p>区间 {} 至 {}（计算自 {}）</p>\n",
        report.window.start, report.window.end, report.window.calc_start
    ));

    if report.matched.is_empty() {
        body.push_str("<p class=\"info\">未找到满足条件的行业板块。</p>\n");
    } else {
        body.push_str("<p class=\"success\">满足条件的行业板块：</p>\n<table>\n");
        body.push_str("<tr><th>行业</th><th>long</th><th>short</th><th>差值</th></tr>\n");
        for verdict in &report.matched {
            body.push_str(&format!(
                "<tr><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td></tr>\n",
                encode_text(&verdict.name),
                verdict.long,
                verdict.short,
                verdict.gap
            ));
        }
        body.push_str("</table>\n");
    }

    if !report.failed.is_empty() {
        let names: Vec<String> = report
            .failed
            .iter()
            .map(|f| encode_text(&f.name).to_string())
            .collect();
        body.push_str(&format!(
            "<p class=\"error\">{} 个行业获取失败：{}</p>\n",
            names.len(),
            names.join("、")
        ));
    }

    page(&body)
}

pub fn render_error(values: &FormValues, message: &str) -> String {
    let mut body = form(values);
    body.push_str(&format!("<p class=\"error\">{}</p>\n", encode_text(message)));
    page(&body)
}
