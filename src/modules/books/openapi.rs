use serde_json::{json, Value};

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn validation_response() -> Value {
    json!({
        "description": "Validation error or missing JSON body",
        "content": {
            "application/json": {
                "schema": {
                    "oneOf": [
                        { "$ref": "#/components/schemas/ValidationErrorResponse" },
                        { "$ref": "#/components/schemas/ErrorResponse" }
                    ]
                }
            }
        }
    })
}

fn json_response(description: &str, schema: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{schema}") }
            }
        }
    })
}

fn id_parameter() -> Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "description": "The book identifier",
        "schema": { "type": "integer", "format": "int64" }
    })
}

fn book_input_body() -> Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookInput" }
            }
        }
    })
}

/// OpenAPI fragment for the books module; paths are relative to `/books`.
pub fn document() -> Value {
    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "Get all books",
                    "tags": ["Books"],
                    "responses": {
                        "200": json_response("Success", "BookList"),
                        "500": error_response("Internal server error")
                    }
                },
                "post": {
                    "summary": "Create a new book",
                    "tags": ["Books"],
                    "requestBody": book_input_body(),
                    "responses": {
                        "201": json_response("Book created", "BookMutation"),
                        "400": validation_response(),
                        "409": error_response("ISBN conflict"),
                        "500": error_response("Internal server error")
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Get a book by ID",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "200": json_response("Success", "BookEnvelope"),
                        "404": error_response("Book not found"),
                        "500": error_response("Internal server error")
                    }
                },
                "put": {
                    "summary": "Update a book",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "requestBody": book_input_body(),
                    "responses": {
                        "200": json_response("Book updated", "BookMutation"),
                        "400": validation_response(),
                        "404": error_response("Book not found"),
                        "409": error_response("ISBN conflict"),
                        "500": error_response("Internal server error")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "200": json_response("Book deleted", "Message"),
                        "404": error_response("Book not found"),
                        "500": error_response("Internal server error")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "format": "int64" },
                        "title": { "type": "string", "description": "Book title" },
                        "author": { "type": "string", "description": "Book author" },
                        "year": { "type": "integer", "description": "Publication year" },
                        "isbn": { "type": "string", "description": "ISBN number" },
                        "created_at": { "type": "string", "format": "date-time" }
                    },
                    "required": ["id", "title", "author", "year", "isbn", "created_at"]
                },
                "BookInput": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "description": "Book title" },
                        "author": { "type": "string", "description": "Book author" },
                        "year": { "type": "integer", "description": "Publication year" },
                        "isbn": { "type": "string", "description": "ISBN number" }
                    },
                    "required": ["title", "author", "year", "isbn"]
                },
                "BookList": {
                    "type": "object",
                    "properties": {
                        "books": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/Book" }
                        },
                        "total": { "type": "integer" }
                    },
                    "required": ["books", "total"]
                },
                "BookEnvelope": {
                    "type": "object",
                    "properties": {
                        "book": { "$ref": "#/components/schemas/Book" }
                    },
                    "required": ["book"]
                },
                "BookMutation": {
                    "type": "object",
                    "properties": {
                        "message": { "type": "string" },
                        "book": { "$ref": "#/components/schemas/Book" }
                    },
                    "required": ["message", "book"]
                },
                "Message": {
                    "type": "object",
                    "properties": {
                        "message": { "type": "string" }
                    },
                    "required": ["message"]
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_operation_is_documented() {
        let doc = document();
        for method in ["get", "post"] {
            assert!(doc["paths"]["/"][method].is_object(), "/ {method}");
        }
        for method in ["get", "put", "delete"] {
            assert!(doc["paths"]["/{id}"][method].is_object(), "/{{id}} {method}");
        }
        assert_eq!(
            doc["components"]["schemas"]["BookInput"]["required"],
            json!(["title", "author", "year", "isbn"])
        );
    }
}
