use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};

use crate::auth::extractor::PageContext;
use crate::error::AppError;
use crate::views::render;

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    page: PageContext,
}

#[derive(Template)]
#[template(path = "contact.html")]
struct ContactTemplate {
    page: PageContext,
}

#[derive(Template)]
#[template(path = "faq.html")]
struct FaqTemplate {
    page: PageContext,
    questions: &'static [Question],
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate {
    page: PageContext,
}

pub struct Question {
    pub question: &'static str,
    pub answer: &'static str,
}

pub const FAQ: &[Question] = &[
    Question {
        question: "Is there a free version?",
        answer: "Yes, we offer a free trial of 30 days.",
    },
    Question {
        question: "Can I cancel anytime?",
        answer: "Yes, you can cancel your subscription at any time without additional charges.",
    },
    Question {
        question: "Do you offer customer support?",
        answer: "Yes, we provide 24/7 customer support through live chat and email.",
    },
    Question {
        question: "What payment methods are accepted?",
        answer: "We accept all major credit cards, PayPal, and direct bank transfers.",
    },
];

pub async fn home(page: PageContext) -> Result<Html<String>, AppError> {
    render(&HomeTemplate { page })
}

pub async fn contact(page: PageContext) -> Result<Html<String>, AppError> {
    render(&ContactTemplate { page })
}

pub async fn faq(page: PageContext) -> Result<Html<String>, AppError> {
    render(&FaqTemplate {
        page,
        questions: FAQ,
    })
}

pub async fn not_found(page: PageContext) -> Result<impl IntoResponse, AppError> {
    Ok((StatusCode::NOT_FOUND, render(&NotFoundTemplate { page })?))
}
