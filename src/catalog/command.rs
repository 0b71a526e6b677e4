pub mod add_author_cmd;
pub mod add_book_cmd;
pub mod list_books_cmd;
pub mod update_stock_cmd;
