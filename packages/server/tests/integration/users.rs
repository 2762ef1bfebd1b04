use reqwest::multipart::{Form, Part};
use serde_json::json;
use uuid::Uuid;

use crate::common::{MAX_IMAGE_SIZE, PASSWORD, TestApp, png_part, routes, uuid_of};

fn update_body(first: &str, last: &str, email: &str) -> serde_json::Value {
    json!({"firstName": first, "lastName": last, "email": email})
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn users_are_paged_in_creation_order() {
        let app = TestApp::spawn().await;
        let first = app.create_user("Ada", "Lovelace").await;
        let second = app.create_user("Grace", "Hopper").await;
        app.create_user("Alan", "Turing").await;

        let res = app
            .get_with_token(&format!("{}?page=1&pageSize=2", routes::USERS), &first.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        // Seeded admin plus three registrations.
        assert_eq!(res.body["totalCount"], 4);
        assert_eq!(res.body["page"], 1);
        assert_eq!(res.body["pageSize"], 2);
        assert_eq!(res.body["totalPages"], 2);
        let items = res.body["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["email"], crate::common::ADMIN_EMAIL);
        assert_eq!(uuid_of(&items[1]["id"]), first.id);

        let page2 = app
            .get_with_token(&format!("{}?page=2&pageSize=2", routes::USERS), &first.token)
            .await;
        let items = page2.body["items"].as_array().unwrap();
        assert_eq!(uuid_of(&items[0]["id"]), second.id);
    }

    #[tokio::test]
    async fn page_parameters_default_and_clamp() {
        let app = TestApp::spawn().await;
        let user = app.create_user("Ada", "Lovelace").await;

        let res = app.get_with_token(routes::USERS, &user.token).await;
        assert_eq!(res.body["page"], 1);
        assert_eq!(res.body["pageSize"], 10);

        let res = app
            .get_with_token(&format!("{}?page=0&pageSize=1000", routes::USERS), &user.token)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["page"], 1);
        assert_eq!(res.body["pageSize"], 100);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let app = TestApp::spawn().await;
        let user = app.create_user("Ada", "Lovelace").await;

        let res = app
            .get_with_token(&format!("{}?page=9", routes::USERS), &user.token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["items"].as_array().unwrap().len(), 0);
        assert_eq!(res.body["totalCount"], 2);
    }

    #[tokio::test]
    async fn listing_requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::USERS).await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn list_all_is_admin_only() {
        let app = TestApp::spawn().await;
        let user = app.create_user("Ada", "Lovelace").await;
        let admin = app.admin().await;

        let denied = app.get_with_token(routes::USERS_ALL, &user.token).await;
        assert_eq!(denied.status, 403);
        assert_eq!(denied.body["code"], "PERMISSION_DENIED");

        let res = app.get_with_token(routes::USERS_ALL, &admin.token).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn get_unknown_user_is_not_found() {
        let app = TestApp::spawn().await;
        let user = app.create_user("Ada", "Lovelace").await;

        let res = app
            .get_with_token(&routes::user(Uuid::now_v7()), &user.token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod direct_creation {
    use super::*;

    #[tokio::test]
    async fn admin_creates_user_with_explicit_role() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;

        let res = app
            .post_with_token(
                routes::USERS,
                &json!({
                    "firstName": "Grace",
                    "lastName": "Hopper",
                    "email": "grace@blog.test",
                    "password": PASSWORD,
                    "role": "ADMIN",
                }),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["role"], "ADMIN");
        assert!(res.body.get("password").is_none());

        // The stored password is hashed, so a normal login works.
        app.login("grace@blog.test", PASSWORD).await;
    }

    #[tokio::test]
    async fn role_defaults_to_user() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;

        let res = app
            .post_with_token(
                routes::USERS,
                &json!({
                    "firstName": "Grace",
                    "lastName": "Hopper",
                    "email": "grace@blog.test",
                    "password": PASSWORD,
                }),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["role"], "USER");
    }

    #[tokio::test]
    async fn regular_user_cannot_create_users() {
        let app = TestApp::spawn().await;
        let user = app.create_user("Ada", "Lovelace").await;

        let res = app
            .post_with_token(
                routes::USERS,
                &json!({
                    "firstName": "Eve",
                    "lastName": "E",
                    "email": "eve@blog.test",
                    "password": PASSWORD,
                    "role": "ADMIN",
                }),
                &user.token,
            )
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let user = app.create_user("Ada", "Lovelace").await;

        let res = app
            .post_with_token(
                routes::USERS,
                &json!({
                    "firstName": "Ada",
                    "lastName": "Again",
                    "email": user.email,
                    "password": PASSWORD,
                }),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "EMAIL_TAKEN");
    }
}

mod updates {
    use super::*;

    #[tokio::test]
    async fn user_updates_own_profile() {
        let app = TestApp::spawn().await;
        let user = app.create_user("Ada", "Lovelace").await;

        let res = app
            .put_with_token(
                &routes::user(user.id),
                &update_body("Augusta", "King", "augusta@blog.test"),
                &user.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["firstName"], "Augusta");
        assert_eq!(res.body["email"], "augusta@blog.test");
        assert_eq!(res.body["role"], "USER");

        // Password is untouched when omitted.
        app.login("augusta@blog.test", PASSWORD).await;
    }

    #[tokio::test]
    async fn password_change_is_hashed_and_usable() {
        let app = TestApp::spawn().await;
        let user = app.create_user("Ada", "Lovelace").await;

        let mut body = update_body("Ada", "Lovelace", &user.email);
        body["password"] = json!("a-brand-new-password");
        let res = app.put_with_token(&routes::user(user.id), &body, &user.token).await;
        assert_eq!(res.status, 200, "{}", res.text);

        app.login(&user.email, "a-brand-new-password").await;
        let old = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": user.email, "password": PASSWORD}),
            )
            .await;
        assert_eq!(old.status, 401);
    }

    #[tokio::test]
    async fn user_cannot_update_someone_else() {
        let app = TestApp::spawn().await;
        let ada = app.create_user("Ada", "Lovelace").await;
        let grace = app.create_user("Grace", "Hopper").await;

        let res = app
            .put_with_token(
                &routes::user(grace.id),
                &update_body("Hacked", "Hopper", &grace.email),
                &ada.token,
            )
            .await;

        assert_eq!(res.status, 403);
        let unchanged = app.get_with_token(&routes::user(grace.id), &ada.token).await;
        assert_eq!(unchanged.body["firstName"], "Grace");
    }

    #[tokio::test]
    async fn user_cannot_promote_themselves() {
        let app = TestApp::spawn().await;
        let user = app.create_user("Ada", "Lovelace").await;

        let mut body = update_body("Ada", "Lovelace", &user.email);
        body["role"] = json!("ADMIN");
        let res = app.put_with_token(&routes::user(user.id), &body, &user.token).await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn admin_can_change_roles_of_others() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;
        let user = app.create_user("Ada", "Lovelace").await;

        let mut body = update_body("Ada", "Lovelace", &user.email);
        body["role"] = json!("ADMIN");
        let res = app.put_with_token(&routes::user(user.id), &body, &admin.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["role"], "ADMIN");
    }

    #[tokio::test]
    async fn taking_another_users_email_is_a_conflict() {
        let app = TestApp::spawn().await;
        let ada = app.create_user("Ada", "Lovelace").await;
        let grace = app.create_user("Grace", "Hopper").await;

        let res = app
            .put_with_token(
                &routes::user(ada.id),
                &update_body("Ada", "Lovelace", &grace.email),
                &ada.token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "EMAIL_TAKEN");
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn user_deletes_own_account() {
        let app = TestApp::spawn().await;
        let user = app.create_user("Ada", "Lovelace").await;
        let admin = app.admin().await;

        let res = app.delete_with_token(&routes::user(user.id), &user.token).await;
        assert_eq!(res.status, 204);

        let gone = app.get_with_token(&routes::user(user.id), &admin.token).await;
        assert_eq!(gone.status, 404);
    }

    #[tokio::test]
    async fn user_cannot_delete_someone_else() {
        let app = TestApp::spawn().await;
        let ada = app.create_user("Ada", "Lovelace").await;
        let grace = app.create_user("Grace", "Hopper").await;

        let res = app.delete_with_token(&routes::user(grace.id), &ada.token).await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn admin_deleting_unknown_user_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.admin().await;

        let res = app
            .delete_with_token(&routes::user(Uuid::now_v7()), &admin.token)
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn deleting_a_user_leaves_their_blogs_in_place() {
        let app = TestApp::spawn().await;
        let user = app.create_user("Ada", "Lovelace").await;
        let blog_id = app.create_blog(&user, "Orphaned").await;

        let res = app.delete_with_token(&routes::user(user.id), &user.token).await;
        assert_eq!(res.status, 204);

        let blog = app.get_without_token(&routes::blog(blog_id)).await;
        assert_eq!(blog.status, 200);
        assert_eq!(blog.body["userFirstName"], "");
        assert_eq!(blog.body["userLastName"], "");
    }
}

mod profile_image {
    use super::*;

    fn image_form() -> Form {
        Form::new().part("image", png_part())
    }

    #[tokio::test]
    async fn upload_stores_the_hosted_url() {
        let app = TestApp::spawn().await;
        let user = app.create_user("Ada", "Lovelace").await;

        let res = app
            .post_multipart(&routes::user_upload_image(user.id), image_form(), &user.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["imageUrl"], "https://media.test/0.png");
        assert_eq!(app.media.uploaded(), vec!["hash-0"]);
    }

    #[tokio::test]
    async fn replacing_an_image_does_not_delete_the_previous_one() {
        let app = TestApp::spawn().await;
        let user = app.create_user("Ada", "Lovelace").await;
        let path = routes::user_upload_image(user.id);

        app.post_multipart(&path, image_form(), &user.token).await;
        let res = app.post_multipart(&path, image_form(), &user.token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["imageUrl"], "https://media.test/1.png");
        assert!(app.media.deleted().is_empty());
    }

    #[tokio::test]
    async fn cannot_upload_for_someone_else() {
        let app = TestApp::spawn().await;
        let ada = app.create_user("Ada", "Lovelace").await;
        let grace = app.create_user("Grace", "Hopper").await;

        let res = app
            .post_multipart(&routes::user_upload_image(grace.id), image_form(), &ada.token)
            .await;

        assert_eq!(res.status, 403);
        assert!(app.media.uploaded().is_empty());
    }

    #[tokio::test]
    async fn non_image_file_is_rejected() {
        let app = TestApp::spawn().await;
        let user = app.create_user("Ada", "Lovelace").await;

        let part = Part::bytes(b"hello".to_vec())
            .file_name("notes.txt")
            .mime_str("text/plain")
            .unwrap();
        let res = app
            .post_multipart(
                &routes::user_upload_image(user.id),
                Form::new().part("image", part),
                &user.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(app.media.uploaded().is_empty());
    }

    #[tokio::test]
    async fn oversized_image_is_rejected() {
        let app = TestApp::spawn().await;
        let user = app.create_user("Ada", "Lovelace").await;

        let part = Part::bytes(vec![0u8; MAX_IMAGE_SIZE + 1])
            .file_name("huge.png")
            .mime_str("image/png")
            .unwrap();
        let res = app
            .post_multipart(
                &routes::user_upload_image(user.id),
                Form::new().part("image", part),
                &user.token,
            )
            .await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert!(app.media.uploaded().is_empty());
    }

    #[tokio::test]
    async fn missing_image_part_is_rejected() {
        let app = TestApp::spawn().await;
        let user = app.create_user("Ada", "Lovelace").await;

        let res = app
            .post_multipart(
                &routes::user_upload_image(user.id),
                Form::new().text("other", "x"),
                &user.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn host_failure_leaves_the_user_unchanged() {
        let app = TestApp::spawn().await;
        let user = app.create_user("Ada", "Lovelace").await;
        app.media.fail_uploads(true);

        let res = app
            .post_multipart(&routes::user_upload_image(user.id), image_form(), &user.token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "MEDIA_ERROR");
        let stored = app.get_with_token(&routes::user(user.id), &user.token).await;
        assert!(stored.body["imageUrl"].is_null());
    }

    #[tokio::test]
    async fn delete_removes_remote_image_then_clears_reference() {
        let app = TestApp::spawn().await;
        let user = app.create_user("Ada", "Lovelace").await;
        app.post_multipart(&routes::user_upload_image(user.id), image_form(), &user.token)
            .await;

        let res = app
            .delete_with_token(&routes::user_delete_image(user.id), &user.token)
            .await;

        assert_eq!(res.status, 204);
        assert_eq!(app.media.deleted(), vec!["hash-0"]);
        let stored = app.get_with_token(&routes::user(user.id), &user.token).await;
        assert!(stored.body["imageUrl"].is_null());
    }

    #[tokio::test]
    async fn delete_without_image_is_a_bad_request() {
        let app = TestApp::spawn().await;
        let user = app.create_user("Ada", "Lovelace").await;

        let res = app
            .delete_with_token(&routes::user_delete_image(user.id), &user.token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn failed_remote_delete_keeps_the_reference() {
        let app = TestApp::spawn().await;
        let user = app.create_user("Ada", "Lovelace").await;
        app.post_multipart(&routes::user_upload_image(user.id), image_form(), &user.token)
            .await;
        app.media.fail_deletes(true);

        let res = app
            .delete_with_token(&routes::user_delete_image(user.id), &user.token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "MEDIA_ERROR");
        let stored = app.get_with_token(&routes::user(user.id), &user.token).await;
        assert_eq!(stored.body["imageUrl"], "https://media.test/0.png");
    }
}
