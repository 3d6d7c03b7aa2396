#[cfg(test)]
mod tests {
    use mockdeck::{
        HttpMethod, JsonFileMappingsProvider, MappingInfo, MockServer, MockServerConfiguration,
        ServerEvent, Workspace,
    };
    use reqwest::blocking::{Client, Response};
    use std::time::{Duration, Instant};

    fn start_server() -> MockServer {
        let mut configuration = MockServerConfiguration::new();
        configuration.set_url("http://127.0.0.1:0/");
        MockServer::start_new(configuration).unwrap()
    }

    fn mapping(method: HttpMethod, path: &str) -> MappingInfo {
        let mut mapping = MappingInfo::new();
        mapping.path = Some(path.to_string());
        mapping.request_http_method = method;
        mapping.response_body = Some(String::from("a sentence"));
        mapping
    }

    fn given_mapping(server: &MockServer, mapping: MappingInfo) -> MappingInfo {
        server.update_mappings(&[mapping.clone()]).unwrap();
        mapping
    }

    fn send(server: &MockServer, method: HttpMethod, path: &str) -> Response {
        let url = format!(
            "{}{}",
            server.base_url().unwrap(),
            path.trim_start_matches('/')
        );
        let method = reqwest::Method::from_bytes(method.as_str().as_bytes()).unwrap();

        Client::new().request(method, url).send().unwrap()
    }

    fn wait_for<F: FnMut() -> bool>(mut condition: F) {
        let started = Instant::now();
        while !condition() {
            assert!(
                started.elapsed() < Duration::from_secs(10),
                "condition was still false after 10s"
            );
            std::thread::sleep(Duration::from_millis(50));
        }
    }

    #[test]
    fn paths_with_a_query_string_match_only_that_query() {
        for method in HttpMethod::ALL.iter().copied() {
            let server = start_server();
            let mapping = given_mapping(
                &server,
                mapping(method, "a/path/with?aQueryString=true&something=else"),
            );

            let response = send(&server, method, "a/path/with?aQueryString=true&something=else");
            assert_eq!(response.status().as_u16(), 200);
            assert_eq!(response.text().unwrap(), mapping.response_body.unwrap());

            let response = send(&server, method, "a/path/with?withAnotherQueryString=true");
            assert_eq!(response.status().as_u16(), 404);
        }
    }

    #[test]
    fn returns_the_configured_status_code() {
        for method in HttpMethod::ALL.iter().copied() {
            for status in &[403u16, 404, 500, 504] {
                let server = start_server();
                let mut mapping = mapping(method, "status");
                mapping.response_status_code = *status;
                given_mapping(&server, mapping);

                let response = send(&server, method, "status");
                assert_eq!(response.status().as_u16(), *status, "{} {}", method, status);
            }
        }
    }

    #[test]
    fn returns_the_configured_body() {
        let cases = [
            (None, ""),
            (Some(""), ""),
            (Some("{isBody: true}"), "{isBody: true}"),
            (Some("b0dy"), "b0dy"),
        ];

        for method in HttpMethod::ALL.iter().copied() {
            let server = start_server();
            for (body, expected) in &cases {
                let mut mapping = mapping(method, "body");
                mapping.response_body = body.map(String::from);
                given_mapping(&server, mapping);

                let response = send(&server, method, "body");
                assert_eq!(response.text().unwrap(), *expected);
            }
        }
    }

    #[test]
    fn guid_tag_is_replaced_by_a_fresh_uuid_per_request() {
        let server = start_server();
        let mut mapping = mapping(HttpMethod::Get, "ids");
        mapping.response_body = Some(String::from("{\"id\": <guid>}"));
        given_mapping(&server, mapping);

        let read_id = || {
            let body = send(&server, HttpMethod::Get, "ids").text().unwrap();
            let value: serde_json::Value = serde_json::from_str(&body).unwrap();
            value["id"].as_str().unwrap().parse::<uuid::Uuid>().unwrap()
        };

        let id = read_id();
        let another_id = read_id();
        assert!(!id.is_nil());
        assert_ne!(id, another_id);
    }

    #[test]
    fn returns_the_configured_headers() {
        let cases = [
            ("Cache-Control", "max-age=30"),
            ("Cache-Control", ""),
            ("Content-Type", "application/json"),
        ];

        for method in HttpMethod::ALL.iter().copied() {
            let server = start_server();
            for (header, value) in &cases {
                let mut mapping = mapping(method, "headers");
                mapping
                    .response_headers
                    .insert(header.to_string(), value.to_string());
                given_mapping(&server, mapping);

                let response = send(&server, method, "headers");
                assert_eq!(response.headers()[*header], *value);
            }
        }
    }

    #[test]
    fn returns_multiple_configured_headers() {
        let server = start_server();
        let mut mapping = mapping(HttpMethod::Post, "headers");
        mapping
            .response_headers
            .insert("Cache-Control".into(), "max-age=30".into());
        mapping
            .response_headers
            .insert("Content-Type".into(), "application/json".into());
        given_mapping(&server, mapping);

        let response = send(&server, HttpMethod::Post, "headers");
        assert_eq!(response.headers()["Cache-Control"], "max-age=30");
        assert_eq!(response.headers()["Content-Type"], "application/json");
    }

    #[test]
    fn method_must_match() {
        let server = start_server();
        given_mapping(&server, mapping(HttpMethod::Put, "only-put"));

        assert_eq!(send(&server, HttpMethod::Put, "only-put").status().as_u16(), 200);
        let response = send(&server, HttpMethod::Get, "only-put");
        assert_eq!(response.status().as_u16(), 404);
        assert_eq!(
            response.text().unwrap(),
            r#"{"Status":"No matching mapping found"}"#
        );
    }

    #[test]
    fn update_mappings_clears_previous_configuration() {
        let server = start_server();
        given_mapping(&server, mapping(HttpMethod::Get, "old"));
        given_mapping(&server, mapping(HttpMethod::Get, "new"));

        assert_eq!(send(&server, HttpMethod::Get, "old").status().as_u16(), 404);
        assert_eq!(send(&server, HttpMethod::Get, "new").status().as_u16(), 200);
    }

    #[test]
    fn new_requests_raise_an_event() {
        for method in HttpMethod::ALL.iter().copied() {
            let server = start_server();
            let mut events = server.subscribe();
            given_mapping(&server, mapping(method, "watched"));

            send(&server, method, "watched?x=1");

            let event = events.try_recv().unwrap();
            match event {
                ServerEvent::NewRequest(entry) => {
                    assert_eq!(entry.method, method.as_str());
                    assert_eq!(entry.path, "/watched");
                }
                other => panic!("unexpected event {:?}", other),
            }
            assert_eq!(server.request_log().unwrap().len(), 1);
        }
    }

    #[test]
    fn colon_in_the_first_path_segment_matches() {
        for method in HttpMethod::ALL.iter().copied() {
            let server = start_server();
            given_mapping(&server, mapping(method, "users:search?q=bob"));

            let response = send(&server, method, "users:search?q=bob");
            assert_eq!(response.status().as_u16(), 200, "{}", method);
            assert_eq!(response.text().unwrap(), "a sentence");
        }
    }

    #[test]
    fn unmatched_requests_are_logged_and_admin_requests_are_not() {
        let server = start_server();
        let mut events = server.subscribe();
        given_mapping(&server, mapping(HttpMethod::Get, "users:search"));

        assert_eq!(send(&server, HttpMethod::Get, "users:search").status().as_u16(), 200);
        assert_eq!(send(&server, HttpMethod::Post, "nomatch").status().as_u16(), 404);
        assert_eq!(
            send(&server, HttpMethod::Get, "__admin/requests").status().as_u16(),
            200
        );
        assert_eq!(
            send(&server, HttpMethod::Delete, "__admin/unknown").status().as_u16(),
            404
        );

        let paths: Vec<String> = server
            .request_log()
            .unwrap()
            .into_iter()
            .map(|entry| entry.path)
            .collect();
        assert_eq!(paths, vec!["/users:search", "/nomatch"]);

        let mut logged = Vec::new();
        while let Ok(event) = events.try_recv() {
            match event {
                ServerEvent::NewRequest(entry) => logged.push((entry.method, entry.path)),
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert_eq!(
            logged,
            vec![
                (String::from("GET"), String::from("/users:search")),
                (String::from("POST"), String::from("/nomatch")),
            ]
        );
    }

    #[test]
    fn stopped_server_refuses_connections_and_restarts() {
        let mut server = start_server();
        given_mapping(&server, mapping(HttpMethod::Get, "up"));
        let base_url = server.base_url().unwrap();

        server.stop().unwrap();
        assert!(Client::new().get(format!("{}up", base_url)).send().is_err());

        server.set_url(base_url.clone()).unwrap();
        server.start().unwrap();
        assert_eq!(send(&server, HttpMethod::Get, "up").status().as_u16(), 200);
    }

    #[test]
    fn admin_interface_lists_mappings_and_requests() {
        let server = start_server();
        let mut mapping = mapping(HttpMethod::Patch, "/orders?state=open");
        mapping.response_status_code = 202;
        given_mapping(&server, mapping);
        send(&server, HttpMethod::Patch, "orders?state=open");

        let base_url = server.base_url().unwrap();
        let client = Client::new();

        let mappings: serde_json::Value = serde_json::from_str(
            &client
                .get(format!("{}__admin/mappings", base_url))
                .send()
                .unwrap()
                .text()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(mappings[0]["Path"], "/orders?state=open");
        assert_eq!(mappings[0]["RequestHttpMethod"], "PATCH");
        assert_eq!(mappings[0]["ResponseStatusCode"], 202);

        let requests: serde_json::Value = serde_json::from_str(
            &client
                .get(format!("{}__admin/requests", base_url))
                .send()
                .unwrap()
                .text()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(requests.as_array().unwrap().len(), 1);
        assert_eq!(requests[0]["path"], "/orders");

        let cleared = client
            .delete(format!("{}__admin/requests", base_url))
            .send()
            .unwrap();
        assert_eq!(cleared.status().as_u16(), 200);
        assert!(server.request_log().unwrap().is_empty());

        let unknown = client
            .get(format!("{}__admin/nothing", base_url))
            .send()
            .unwrap();
        assert_eq!(unknown.status().as_u16(), 404);
    }

    #[test]
    fn admin_interface_can_be_disabled() {
        let mut configuration = MockServerConfiguration::new();
        configuration.set_url("http://127.0.0.1:0/");
        configuration.set_admin_interface(false);
        let server = MockServer::start_new(configuration).unwrap();
        given_mapping(&server, mapping(HttpMethod::Get, "__admin/mappings"));

        let response = send(&server, HttpMethod::Get, "__admin/mappings");
        assert_eq!(response.text().unwrap(), "a sentence");
    }

    #[test]
    fn workspace_applies_persists_and_logs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mappings.json");

        {
            let mut configuration = MockServerConfiguration::new();
            configuration.set_url("http://127.0.0.1:0/");
            let mut workspace = Workspace::open(
                MockServer::new(configuration),
                JsonFileMappingsProvider::new(&path),
            )
            .unwrap();

            let index = workspace.add_mapping();
            workspace.mapping_mut(index).unwrap().path = Some(String::from("hello"));
            let mut editor = workspace.edit_response(index).unwrap();
            editor.set_body(Some(String::from("world")));
            workspace.commit_response(index, &editor).unwrap();
            workspace.apply().unwrap();
            workspace.start_server().unwrap();
            assert!(workspace.is_server_started());

            let response = send(workspace.server(), HttpMethod::Get, "hello");
            assert_eq!(response.text().unwrap(), "world");

            wait_for(|| {
                workspace.pump_events();
                !workspace.logs().is_empty()
            });
            assert!(workspace.logs().contains("[GET] Path: {/hello} Request body: {}"));
            assert!(workspace.logs().ends_with('\n'));

            workspace.stop_server().unwrap();
            assert!(!workspace.is_server_started());
        }

        let mut configuration = MockServerConfiguration::new();
        configuration.set_url("http://127.0.0.1:0/");
        let reopened = Workspace::open(
            MockServer::new(configuration),
            JsonFileMappingsProvider::new(&path),
        )
        .unwrap();
        assert_eq!(reopened.mappings().len(), 1);
        assert_eq!(reopened.mappings()[0].response_body.as_deref(), Some("world"));
    }
}
