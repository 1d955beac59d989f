use serde_json::json;

use crate::common::{FilePart, TestApp, routes};

mod settings {
    use super::*;

    async fn save_settings(app: &TestApp, logo: &str) -> crate::common::TestResponse {
        app.put_form(
            routes::SETTINGS,
            &[
                ("name", "Drishti Academy"),
                ("phone", "9876543210"),
                ("email", "info@example.com"),
                ("telegram", "https://t.me/drishti"),
            ],
            Some(FilePart::jpeg(logo)),
        )
        .await
    }

    #[tokio::test]
    async fn settings_are_missing_until_first_save() {
        let app = TestApp::spawn().await;

        app.get(routes::SETTINGS).await.assert_error(404, "NOT_FOUND");
        app.get(routes::PUBLIC_SETTINGS)
            .await
            .assert_error(404, "NOT_FOUND");
    }

    #[tokio::test]
    async fn first_save_requires_contact_details() {
        let app = TestApp::spawn().await;

        let res = app.put(routes::SETTINGS, &json!({"name": "Drishti Academy"})).await;

        res.assert_error(400, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn saving_twice_edits_one_record_and_replaces_the_logo() {
        let app = TestApp::spawn().await;
        let first = save_settings(&app, "logo.jpg").await;
        assert_eq!(first.status, 200, "{}", first.text);
        let old_logo = first.body["media"]["key"].as_str().unwrap().to_string();
        assert!(old_logo.starts_with("web/"), "key was {old_logo}");

        let second = save_settings(&app, "logo-2025.jpg").await;

        assert_eq!(second.status, 200, "{}", second.text);
        assert_eq!(second.id(), first.id());
        assert!(!app.media_exists(&old_logo));
        let new_logo = second.body["media"]["key"].as_str().unwrap();
        assert!(app.media_exists(new_logo));

        let public = app.get(routes::PUBLIC_SETTINGS).await;
        assert_eq!(public.status, 200, "{}", public.text);
        assert_eq!(public.body["fields"]["telegram"], "https://t.me/drishti");
        assert_eq!(public.body["media"]["key"], new_logo);
    }

    #[tokio::test]
    async fn partial_save_keeps_other_fields() {
        let app = TestApp::spawn().await;
        save_settings(&app, "logo.jpg").await;

        let res = app
            .put(routes::SETTINGS, &json!({"whatsapp": "919876543210"}))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["fields"]["whatsapp"], "919876543210");
        assert_eq!(res.body["fields"]["email"], "info@example.com");
        assert!(res.body["media"]["key"].is_string());
    }

    #[tokio::test]
    async fn collection_routes_do_not_serve_singletons() {
        let app = TestApp::spawn().await;
        let saved = save_settings(&app, "logo.jpg").await;

        app.get(&routes::admin_record("settings", &saved.id()))
            .await
            .assert_error(404, "NOT_FOUND");
        app.delete(&routes::admin_record("settings", &saved.id()))
            .await
            .assert_error(404, "NOT_FOUND");
        app.get(&routes::public_record("result-section", "anything"))
            .await
            .assert_error(404, "NOT_FOUND");
    }
}

mod result_section {
    use super::*;

    #[tokio::test]
    async fn button_defaults_are_filled_on_first_save() {
        let app = TestApp::spawn().await;

        let res = app
            .put(
                routes::RESULT_SECTION,
                &json!({"description": "Our students lead the merit list every year."}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["entity"], "result-section");
        assert_eq!(res.body["fields"]["buttonText"], "View All Results");
        assert_eq!(res.body["fields"]["buttonLink"], "/results");

        let public = app.get(routes::PUBLIC_RESULT_SECTION).await;
        assert_eq!(public.status, 200, "{}", public.text);
        assert_eq!(public.body["id"], res.body["id"]);
    }

    #[tokio::test]
    async fn description_is_required() {
        let app = TestApp::spawn().await;

        let res = app
            .put(routes::RESULT_SECTION, &json!({"buttonText": "See toppers"}))
            .await;

        res.assert_error(400, "VALIDATION_ERROR");
    }
}
