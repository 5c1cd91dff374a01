pub mod books;

use bookshelf_kernel::ModuleRegistry;

use books::service::BookService;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, book_service: BookService) {
    registry.register(books::create_module(book_service));
}
